//! Wrappers around the Python API of Gymnasium (the new version of OpenAI gym)
use {
    super::{
        Step,
        VectorConvertible,
    },
    anyhow::{
        anyhow,
        Error,
        Result,
    },
    pyo3::{
        types::{
            PyDict,
            PyTuple,
        },
        PyAny,
        PyErr,
        PyObject,
        PyResult,
        Python,
    },
    tracing::info,
};

fn w(res: PyErr) -> Error {
    anyhow!(res)
}

fn get_observation<O>(
    obs: &PyAny,
    flatten_obs: bool,
) -> PyResult<O>
where
    O: VectorConvertible,
{
    Ok(if flatten_obs {
        // grid observations arrive as nested lists and get flattened the
        // same way regardless of rank
        let values = if let Ok(grid) = obs.extract::<Vec<Vec<Vec<f64>>>>() {
            grid.into_iter().flatten().flatten().collect()
        } else if let Ok(rows) = obs.extract::<Vec<Vec<f64>>>() {
            rows.into_iter().flatten().collect()
        } else {
            obs.extract::<Vec<f64>>()?
        };
        O::from_vec(values)
    } else {
        O::from_vec(obs.extract::<Vec<f64>>()?)
    })
}

pub fn gym_create_env(name: &str) -> Result<PyObject> {
    Python::with_gil(|py| {
        let sys = py.import("sys")?;
        let version: String = sys.getattr("version")?.extract()?;
        let path: String = sys.getattr("executable")?.extract()?;
        info!("PYTHON VERSION: {version}");
        info!("PYTHON EXECUTABLE: {path}");
        let gym = py.import("gymnasium")?;
        let make = gym.getattr("make")?;
        let env = make.call1((name,))?;
        Ok(env.into())
    })
    .map_err(w)
}

/// Read the `(action_space, observation_space)` shapes off the environment.
///
/// Queried separately from creation because reconfiguring the environment
/// can change both spaces.
pub fn gym_env_spaces(env: &PyObject) -> Result<(Vec<usize>, Vec<usize>)> {
    Python::with_gil(|py| {
        let env = env.as_ref(py);
        let action_space = env.getattr("action_space")?.getattr("shape")?.extract()?;
        let observation_space = env
            .getattr("observation_space")?
            .getattr("shape")?
            .extract()?;
        Ok((action_space, observation_space))
    })
    .map_err(w)
}

pub fn gym_reset_env<O>(
    env: &PyObject,
    seed: u64,
    flatten_obs: bool,
) -> Result<O>
where
    O: VectorConvertible,
{
    Python::with_gil(|py| {
        let kwargs = PyDict::new(py);
        kwargs.set_item("seed", seed)?;
        let observation = env.call_method(py, "reset", (), Some(kwargs))?;
        get_observation(observation.as_ref(py).get_item(0)?, flatten_obs)
    })
    .map_err(w)
}

pub fn gym_step_env<O, A>(
    env: &PyObject,
    action: A,
    flatten_obs: bool,
) -> Result<Step<O, A>>
where
    O: VectorConvertible,
    A: VectorConvertible + Clone + std::fmt::Debug,
{
    let (observation, reward, terminated, truncated) = Python::with_gil(|py| {
        let action_values = PyTuple::new(py, <A>::to_vec(action.clone()).iter());
        let step = env.call_method(py, "step", (action_values,), None)?;
        let step = step.as_ref(py);
        let observation = get_observation(step.get_item(0)?, flatten_obs)?;
        let reward: f64 = step.get_item(1)?.extract()?;
        let terminated: bool = step.get_item(2)?.extract()?;
        let truncated: bool = step.get_item(3)?.extract()?;
        Ok((observation, reward, terminated, truncated))
    })
    .map_err(w)?;
    Ok(Step {
        observation,
        action,
        reward,
        terminated,
        truncated,
    })
}
