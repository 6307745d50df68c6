//! Repeat policies shared by smart and dumb actions

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::EngineError;

/// How often an action body (or a whole dumb scenario) runs
///
/// Defaults to a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repeatable {
    pub repeat_count: u32,
    /// Wins over `repeat_count` when true
    #[serde(default)]
    pub is_repeat_infinite: bool,
    /// Sleep between iterations, never after the last
    #[serde(
        default,
        with = "super::opt_duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub repeat_delay: Option<Duration>,
}

impl Default for Repeatable {
    fn default() -> Self {
        Self::once()
    }
}

impl Repeatable {
    /// Run the body a single time
    pub fn once() -> Self {
        Self::times(1)
    }

    pub fn times(repeat_count: u32) -> Self {
        Self {
            repeat_count,
            is_repeat_infinite: false,
            repeat_delay: None,
        }
    }

    pub fn infinite() -> Self {
        Self {
            repeat_count: 0,
            is_repeat_infinite: true,
            repeat_delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.repeat_delay = Some(delay);
        self
    }

    /// Run `body` under this policy.
    ///
    /// Sleeps `repeat_delay` between iterations only. Stops early when the
    /// token is cancelled or the body fails; cancellation is not an error.
    pub fn repeat<F>(&self, cancel: &CancellationToken, mut body: F) -> Result<(), EngineError>
    where
        F: FnMut() -> Result<(), EngineError>,
    {
        if self.is_repeat_infinite {
            loop {
                if cancel.is_cancelled() {
                    return Ok(());
                }
                body()?;
                if !self.delay_next_iteration(cancel) {
                    return Ok(());
                }
            }
        }

        for iteration in 0..self.repeat_count {
            if cancel.is_cancelled() {
                return Ok(());
            }
            body()?;
            if iteration + 1 < self.repeat_count && !self.delay_next_iteration(cancel) {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Returns false when the delay was interrupted by cancellation
    fn delay_next_iteration(&self, cancel: &CancellationToken) -> bool {
        match self.repeat_delay {
            Some(delay) if !delay.is_zero() => cancel.sleep(delay),
            _ => !cancel.is_cancelled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_repeat_runs_exact_count() {
        let mut runs = 0;
        Repeatable::times(3)
            .repeat(&CancellationToken::new(), || {
                runs += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(runs, 3);
    }

    #[test]
    fn test_repeat_delays_between_iterations_only() {
        let delay = Duration::from_millis(40);
        let mut runs = 0;
        let started = Instant::now();
        Repeatable::times(3)
            .with_delay(delay)
            .repeat(&CancellationToken::new(), || {
                runs += 1;
                Ok(())
            })
            .unwrap();

        let elapsed = started.elapsed();
        assert_eq!(runs, 3);
        // Two inter-iteration delays, no trailing one.
        assert!(elapsed >= delay * 2, "elapsed {elapsed:?}");
        assert!(elapsed < delay * 3, "elapsed {elapsed:?}");
    }

    #[test]
    fn test_repeat_zero_delay_does_not_sleep() {
        let started = Instant::now();
        Repeatable::times(5)
            .with_delay(Duration::ZERO)
            .repeat(&CancellationToken::new(), || Ok(()))
            .unwrap();
        assert!(started.elapsed() < Duration::from_millis(30));
    }

    #[test]
    fn test_repeat_zero_count_never_runs() {
        let mut runs = 0;
        Repeatable::times(0)
            .repeat(&CancellationToken::new(), || {
                runs += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(runs, 0);
    }

    #[test]
    fn test_infinite_repeat_stops_on_cancel() {
        let token = CancellationToken::new();
        let remote = token.clone();
        let mut runs = 0u32;
        Repeatable::infinite()
            .repeat(&token, || {
                runs += 1;
                if runs == 10 {
                    remote.cancel();
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(runs, 10);
    }

    #[test]
    fn test_repeat_propagates_body_error() {
        let result = Repeatable::times(3).repeat(&CancellationToken::new(), || {
            Err(EngineError::AlreadyRunning)
        });
        assert!(result.is_err());
    }
}
