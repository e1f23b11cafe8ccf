use {
    super::super::{
        Sampleable,
        TensorConvertible,
        VectorConvertible,
    },
    candle_core::{
        Device,
        Tensor,
    },
    rand::{
        Rng,
        RngCore,
    },
    std::ops::RangeInclusive,
};

/// The action of the [`LaneEnv`](super::lane_env::LaneEnv) environment.
///
/// A [LaneAction] is a 2-dimensional vector of the form
/// `[steering, acceleration]`: the front-wheel steering angle in radians and
/// the longitudinal acceleration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneAction {
    steering: f64,
    acceleration: f64,
}
impl LaneAction {
    pub fn new(
        steering: f64,
        acceleration: f64,
    ) -> Self {
        Self {
            steering,
            acceleration,
        }
    }

    pub fn steering(&self) -> f64 {
        self.steering
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    /// Restrict the [LaneAction] to the physically possible control range.
    pub fn restrict(
        self,
        max_steering: f64,
        max_acceleration: f64,
    ) -> Self {
        Self {
            steering: self.steering.clamp(-max_steering, max_steering),
            acceleration: self.acceleration.clamp(-max_acceleration, max_acceleration),
        }
    }
}

impl Sampleable for LaneAction {
    /// Sample a random [LaneAction] uniformly from the given domain.
    ///
    /// This function panics if the number of ranges in the domain is not 2.
    fn sample(
        rng: &mut dyn RngCore,
        domain: &[RangeInclusive<f64>],
    ) -> Self {
        assert!(domain.len() == 2);
        Self {
            steering: rng.gen_range(domain[0].clone()),
            acceleration: rng.gen_range(domain[1].clone()),
        }
    }
}

impl VectorConvertible for LaneAction {
    /// Convert a [`Vec<f64>`] into a [LaneAction] with preprocessing
    ///
    /// Preprocessing is currently a no-op
    fn from_vec_pp(value: Vec<f64>) -> Self {
        Self::from_vec(value)
    }

    /// Convert a [`Vec<f64>`] into a [LaneAction]
    ///
    /// Panics if the Vec does not have exactly 2 elements.
    fn from_vec(value: Vec<f64>) -> Self {
        assert!(value.len() == 2);
        Self::new(value[0], value[1])
    }

    /// Convert a [LaneAction] into a [`Vec<f64>`] of the form
    /// `[steering, acceleration]`
    fn to_vec(value: Self) -> Vec<f64> {
        vec![value.steering, value.acceleration]
    }
}

impl TensorConvertible for LaneAction {
    fn from_tensor_pp(value: Tensor) -> Self {
        Self::from_tensor(value)
    }

    fn from_tensor(value: Tensor) -> Self {
        Self::from_vec(value.to_vec1::<f64>().unwrap())
    }

    /// Convert a [LaneAction] to a [Tensor] (with no batch dimension) on
    /// the given device.
    fn to_tensor(
        value: Self,
        device: &Device,
    ) -> candle_core::Result<Tensor> {
        Tensor::new(Self::to_vec(value), device)
    }
}
