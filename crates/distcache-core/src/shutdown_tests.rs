//! Tests for `shutdown` module

#[cfg(test)]
mod tests {
    use crate::shutdown::ShutdownFlag;

    #[test]
    fn starts_not_requested() {
        let flag = ShutdownFlag::new();
        assert!(!flag.is_requested());
    }

    #[test]
    fn request_is_observed_by_clones() {
        let flag = ShutdownFlag::new();
        let clone = flag.clone();

        flag.request();

        assert!(flag.is_requested());
        assert!(clone.is_requested());
    }

    #[test]
    fn request_is_idempotent() {
        let flag = ShutdownFlag::new();
        flag.request();
        flag.request();
        assert!(flag.is_requested());
    }
}
