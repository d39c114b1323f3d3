//! External live-price providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_millis(750);
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("price provider unavailable: {0}")]
    Unavailable(String),
    #[error("price provider gave no answer within {0:?}")]
    TimedOut(Duration),
    #[error("price provider panicked")]
    Panicked,
    #[error("{0} earlier price lookups are still running")]
    Saturated(usize),
}

/// Live price lookup for a canonical material name, in currency per kg.
/// `Ok(None)` means the provider has no quote for the material.
pub trait PriceProvider: Send + Sync {
    fn price(&self, material: &str, region: Option<&str>) -> Result<Option<f64>, ProviderError>;
}

impl<F> PriceProvider for F
where
    F: Fn(&str, Option<&str>) -> Result<Option<f64>, ProviderError> + Send + Sync,
{
    fn price(&self, material: &str, region: Option<&str>) -> Result<Option<f64>, ProviderError> {
        self(material, region)
    }
}

/// Runs a provider on a worker thread and stops waiting after `timeout`.
/// A provider that overruns is abandoned, not cancelled.
///
/// The deadline applies per lookup; a report prices up to five materials in
/// turn, so a stalled provider can delay it by five timeouts at most. Abandoned
/// workers count against `max_in_flight`, and once that many are still running
/// lookups fail fast with [`ProviderError::Saturated`] instead of spawning.
pub struct DeadlineProvider<P> {
    inner: Arc<P>,
    timeout: Duration,
    max_in_flight: usize,
    in_flight: Arc<AtomicUsize>,
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<P> DeadlineProvider<P>
where
    P: PriceProvider + 'static,
{
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn with_default_timeout(inner: P) -> Self {
        Self::new(inner, DEFAULT_PROVIDER_TIMEOUT)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<P> PriceProvider for DeadlineProvider<P>
where
    P: PriceProvider + 'static,
{
    fn price(&self, material: &str, region: Option<&str>) -> Result<Option<f64>, ProviderError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlight(Arc::clone(&self.in_flight));
        if running >= self.max_in_flight {
            return Err(ProviderError::Saturated(running));
        }

        let (sender, receiver) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let material = material.to_string();
        let region = region.map(str::to_string);

        thread::Builder::new()
            .name("price-provider".to_string())
            .spawn(move || {
                let _guard = guard;
                let _ = sender.send(inner.price(&material, region.as_deref()));
            })
            .map_err(|error| ProviderError::Unavailable(error.to_string()))?;

        match receiver.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ProviderError::TimedOut(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(ProviderError::Panicked),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::{DeadlineProvider, PriceProvider, ProviderError};

    #[test]
    fn closures_are_providers() {
        let provider = |material: &str, region: Option<&str>| -> Result<Option<f64>, ProviderError> {
            Ok(if material == "Urea" && region == Some("Punjab") { Some(38.0) } else { None })
        };

        assert_eq!(provider.price("Urea", Some("Punjab")), Ok(Some(38.0)));
        assert_eq!(provider.price("Urea", None), Ok(None));
    }

    #[test]
    fn deadline_passes_through_fast_answers() {
        let provider = DeadlineProvider::new(
            |_: &str, _: Option<&str>| -> Result<Option<f64>, ProviderError> { Ok(Some(41.5)) },
            Duration::from_millis(500),
        );

        assert_eq!(provider.price("Urea", None), Ok(Some(41.5)));
    }

    #[test]
    fn slow_providers_time_out() {
        let provider = DeadlineProvider::new(
            |_: &str, _: Option<&str>| -> Result<Option<f64>, ProviderError> {
                thread::sleep(Duration::from_millis(300));
                Ok(Some(41.5))
            },
            Duration::from_millis(20),
        );

        assert_eq!(
            provider.price("Urea", None),
            Err(ProviderError::TimedOut(Duration::from_millis(20)))
        );
    }

    #[test]
    fn stalled_workers_cap_new_lookups() {
        let provider = DeadlineProvider::new(
            |_: &str, _: Option<&str>| -> Result<Option<f64>, ProviderError> {
                thread::sleep(Duration::from_millis(400));
                Ok(Some(41.5))
            },
            Duration::from_millis(10),
        )
        .with_max_in_flight(1);

        assert_eq!(
            provider.price("Urea", None),
            Err(ProviderError::TimedOut(Duration::from_millis(10)))
        );
        assert_eq!(provider.price("DAP", None), Err(ProviderError::Saturated(1)));

        thread::sleep(Duration::from_millis(600));
        assert_eq!(
            provider.price("MOP", None),
            Err(ProviderError::TimedOut(Duration::from_millis(10)))
        );
    }

    #[test]
    fn panicking_providers_are_reported() {
        let provider = DeadlineProvider::new(
            |_: &str, _: Option<&str>| -> Result<Option<f64>, ProviderError> {
                panic!("upstream exploded")
            },
            Duration::from_millis(500),
        );

        assert_eq!(provider.price("Urea", None), Err(ProviderError::Panicked));
    }
}
