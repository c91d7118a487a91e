use crate::error::AppError;

/// Result of one pipeline stage. `Degraded` carries the value the pipeline
/// continues with in place of the real output.
#[derive(Debug)]
pub enum StageOutcome<T> {
    Ok(T),
    Degraded { value: T, reason: String },
    Fatal(AppError),
}

impl<T> StageOutcome<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        StageOutcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }

    /// The value to continue with, degraded or not.
    pub fn into_result(self) -> Result<T, AppError> {
        match self {
            StageOutcome::Ok(t) => Ok(t),
            StageOutcome::Degraded { value, .. } => Ok(value),
            StageOutcome::Fatal(e) => Err(e),
        }
    }

    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        match self {
            StageOutcome::Ok(t) => t,
            StageOutcome::Degraded { value, .. } => value,
            StageOutcome::Fatal(_) => T::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_value_is_still_usable() {
        let outcome = StageOutcome::degraded(String::from("sentinel"), "provider down");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.into_result().unwrap(), "sentinel");
    }

    #[test]
    fn fatal_falls_back_to_default() {
        let fatal: StageOutcome<Vec<u8>> =
            StageOutcome::Fatal(AppError::InvalidArgument("bad".into()));
        assert!(fatal.unwrap_or_default().is_empty());

        let degraded = StageOutcome::degraded(vec![1u8], "partial");
        assert_eq!(degraded.unwrap_or_default(), vec![1]);
    }
}
