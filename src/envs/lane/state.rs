use {
    super::super::{
        TensorConvertible,
        VectorConvertible,
    },
    candle_core::{
        Device,
        Tensor,
    },
    serde::Serialize,
};

/// The observation of the [`LaneEnv`](super::lane_env::LaneEnv) environment.
///
/// A [LaneObs] is a 4-dimensional vector of the form
/// `[lateral, heading, speed, progress]`: the signed lateral offset from the
/// lane center, the heading angle relative to the road axis, the current
/// speed, and the fraction of the road already covered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LaneObs {
    lateral: f64,
    heading: f64,
    speed: f64,
    progress: f64,
}
impl LaneObs {
    pub fn new(
        lateral: f64,
        heading: f64,
        speed: f64,
        progress: f64,
    ) -> Self {
        Self {
            lateral,
            heading,
            speed,
            progress,
        }
    }

    pub fn lateral(&self) -> f64 {
        self.lateral
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }
}

impl VectorConvertible for LaneObs {
    /// Convert a [`Vec<f64>`] into a [LaneObs] with preprocessing
    ///
    /// Preprocessing is currently a no-op
    fn from_vec_pp(value: Vec<f64>) -> Self {
        Self::from_vec(value)
    }

    /// Convert a [`Vec<f64>`] into a [LaneObs]
    ///
    /// Panics if the Vec does not have exactly 4 elements.
    fn from_vec(value: Vec<f64>) -> Self {
        assert!(value.len() == 4);
        Self::new(value[0], value[1], value[2], value[3])
    }

    /// Convert a [LaneObs] into a [`Vec<f64>`] of the form
    /// `[lateral, heading, speed, progress]`
    fn to_vec(value: Self) -> Vec<f64> {
        vec![value.lateral, value.heading, value.speed, value.progress]
    }
}

impl TensorConvertible for LaneObs {
    fn from_tensor_pp(value: Tensor) -> Self {
        Self::from_tensor(value)
    }

    fn from_tensor(value: Tensor) -> Self {
        Self::from_vec(value.to_vec1::<f64>().unwrap())
    }

    /// Convert a [LaneObs] to a [Tensor] (with no batch dimension) on
    /// the given device.
    fn to_tensor(
        value: Self,
        device: &Device,
    ) -> candle_core::Result<Tensor> {
        Tensor::new(Self::to_vec(value), device)
    }
}
