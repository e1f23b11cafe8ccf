use {
    candle_core::{
        Device,
        Result,
        Tensor,
    },
    rand::{
        rngs::StdRng,
        Rng,
        SeedableRng,
    },
    rand_distr::StandardNormal,
};

/// Temporally correlated exploration noise from an Ornstein-Uhlenbeck process.
///
/// The internal state performs a mean-reverting random walk: unlike i.i.d.
/// Gaussian noise, consecutive samples are correlated, which suits control
/// tasks with momentum. `sigma` anneals linearly from `max_sigma` to
/// `min_sigma` over `decay_period` steps so the policy's own actions dominate
/// late in training.
pub struct OuNoise {
    mu: f64,
    theta: f64,
    sigma: f64,
    max_sigma: f64,
    min_sigma: f64,
    decay_period: usize,
    size_action: usize,
    low: Tensor,
    high: Tensor,
    state: Tensor,
    rng: StdRng,
}
impl OuNoise {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mu: f64,
        theta: f64,
        max_sigma: f64,
        min_sigma: f64,
        decay_period: usize,
        size_action: usize,
        low: Vec<f64>,
        high: Vec<f64>,
        seed: u64,
        device: &Device,
    ) -> Result<Self> {
        Ok(Self {
            mu,
            theta,
            sigma: max_sigma,
            max_sigma,
            min_sigma,
            decay_period,
            size_action,
            low: Tensor::new(low, device)?,
            high: Tensor::new(high, device)?,
            state: Tensor::full(mu, size_action, device)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Reset the process state to `mu`, one entry per action dimension.
    ///
    /// Called at every episode start.
    pub fn reset(&mut self) -> Result<()> {
        self.state = Tensor::full(self.mu, self.size_action, self.state.device())?;
        Ok(())
    }

    /// Advance the process by one step and return the updated state.
    pub fn evolve_state(&mut self) -> Result<Tensor> {
        let rand: Vec<f64> = (0..self.size_action)
            .map(|_| self.rng.sample(StandardNormal))
            .collect();
        let rand = Tensor::from_vec(rand, self.size_action, self.state.device())?;

        let dx = ((self.theta * (self.mu - &self.state)?)? + (self.sigma * rand)?)?;
        self.state = (&self.state + dx)?;
        Ok(self.state.clone())
    }

    /// Perturb a raw policy action with the evolved noise state.
    ///
    /// `t` is the global step counter driving the sigma anneal; past
    /// `decay_period` the anneal is clamped at `min_sigma`. The returned
    /// action is clipped to `[low, high]`.
    pub fn get_action(
        &mut self,
        action: &Tensor,
        t: usize,
    ) -> Result<Tensor> {
        self.sigma = self.max_sigma
            - (self.max_sigma - self.min_sigma) * (t as f64 / self.decay_period as f64).min(1.0);

        (action + self.evolve_state()?)?
            .minimum(&self.high)?
            .maximum(&self.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(max_sigma: f64, min_sigma: f64) -> OuNoise {
        OuNoise::new(
            0.0,
            0.15,
            max_sigma,
            min_sigma,
            100,
            2,
            vec![-0.5, -2.0],
            vec![0.5, 2.0],
            42,
            &Device::Cpu,
        )
        .unwrap()
    }

    #[test]
    fn reset_returns_state_to_mu() {
        let mut noise = noise(0.3, 0.3);
        noise.evolve_state().unwrap();
        noise.evolve_state().unwrap();
        assert!(noise
            .state
            .to_vec1::<f64>()
            .unwrap()
            .iter()
            .any(|x| *x != 0.0));

        noise.reset().unwrap();
        assert_eq!(noise.state.to_vec1::<f64>().unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn actions_are_clipped_to_bounds() {
        // a huge sigma guarantees raw noise far outside the bounds
        let mut noise = noise(50.0, 50.0);
        let action = Tensor::new(vec![0.0, 0.0], &Device::Cpu).unwrap();

        for t in 0..100 {
            let noisy = noise.get_action(&action, t).unwrap();
            let noisy = noisy.to_vec1::<f64>().unwrap();
            assert!((-0.5..=0.5).contains(&noisy[0]));
            assert!((-2.0..=2.0).contains(&noisy[1]));
        }
    }

    #[test]
    fn sigma_decays_linearly_and_clamps_at_min() {
        let mut noise = noise(0.4, 0.1);
        let action = Tensor::new(vec![0.0, 0.0], &Device::Cpu).unwrap();

        noise.get_action(&action, 0).unwrap();
        assert!((noise.sigma - 0.4).abs() < 1e-12);

        noise.get_action(&action, 50).unwrap();
        assert!((noise.sigma - 0.25).abs() < 1e-12);

        noise.get_action(&action, 100).unwrap();
        assert!((noise.sigma - 0.1).abs() < 1e-12);

        // clamped past the decay period
        noise.get_action(&action, 100_000).unwrap();
        assert!((noise.sigma - 0.1).abs() < 1e-12);
    }
}
