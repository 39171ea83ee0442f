use std::{
    fmt,
    fmt::{Debug, Display},
};

/// Wrapper that keeps credentials and tokens out of logs. The inner value is
/// only reachable through [`Secret::reveal`]; `Debug` and `Display` both
/// render a fixed mask.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    inner: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn reveal(&self) -> &T {
        &self.inner
    }
}

impl<T: Clone + Default> From<T> for Secret<T> {
    fn from(inner: T) -> Self {
        Self::new(inner)
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[cfg(test)]
mod test {
    use super::Secret;

    #[test]
    fn formatting_never_leaks_the_value() {
        let secret = Secret::new("hunter2".to_string());
        assert_eq!(format!("{secret}"), "****");
        assert_eq!(format!("{secret:?}"), "****");
        assert_eq!(secret.reveal(), "hunter2");
    }
}
