use crate::domain::payment::Payment;
use crate::domain::ports::PaymentGateway;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Probability that a simulated attempt succeeds when nothing else is configured.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.9;

/// Settings for [`SimulatedGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Probability in `[0, 1]` that an attempt succeeds.
    pub success_rate: f64,
    /// Seed for a reproducible sequence of outcomes.
    pub seed: Option<u64>,
    /// Artificial delay before each outcome is reported.
    pub latency: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            success_rate: DEFAULT_SUCCESS_RATE,
            seed: None,
            latency: Duration::ZERO,
        }
    }
}

/// A stand-in for a real payment processor.
///
/// Each attempt succeeds with the configured probability.
pub struct SimulatedGateway {
    success_rate: f64,
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            success_rate: config.success_rate.clamp(0.0, 1.0),
            latency: config.latency,
            rng: Mutex::new(rng),
        }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(GatewayConfig::default())
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn attempt(&self, payment: &Payment) -> bool {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let approved = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_bool(self.success_rate)
        };
        debug!(payment_id = payment.payment_id, approved, "simulated gateway attempt");
        approved
    }
}
