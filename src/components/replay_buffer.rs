use {
    candle_core::{
        bail,
        Result,
        Tensor,
    },
    rand::{
        seq::index,
        RngCore,
    },
    unzip_n::unzip_n,
};

unzip_n!(5);

/// A single step of environment interaction.
///
/// # Fields
///
/// * `state` - The state tensor, shape `(state_dim,)`.
/// * `action` - The action tensor, shape `(action_dim,)`.
/// * `reward` - The reward tensor, shape `(1,)`.
/// * `next_state` - The next state tensor, shape `(state_dim,)`.
/// * `done` - The episode-over flag as a `(1,)` tensor holding 0.0 or 1.0.
///
/// Transitions are immutable once stored and owned by their buffer slot.
#[derive(Clone)]
pub struct Transition {
    state: Tensor,
    action: Tensor,
    reward: Tensor,
    next_state: Tensor,
    done: Tensor,
}
impl Transition {
    pub fn new(
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        done: &Tensor,
    ) -> Self {
        Self {
            state: state.clone(),
            action: action.clone(),
            reward: reward.clone(),
            next_state: next_state.clone(),
            done: done.clone(),
        }
    }
}

/// A replay buffer for off-policy algorithms.
///
/// The buffer is a fixed-capacity ring: it fills up to `capacity` and then
/// wraps around, overwriting the oldest transition at the write cursor
/// (FIFO eviction). It never shrinks.
#[derive(Clone)]
pub struct ReplayBuffer {
    buffer: Vec<Transition>,
    capacity: usize,
    position: usize,
}
impl ReplayBuffer {
    /// Create a new replay buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
            position: 0,
        }
    }

    /// The number of populated slots.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Check if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    /// Push a transition into the slot at the write cursor.
    ///
    /// Until the buffer reaches capacity this appends; afterwards it
    /// overwrites the oldest transition. O(1) either way.
    pub fn push(
        &mut self,
        transition: Transition,
    ) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(transition);
        } else {
            self.buffer[self.position] = transition;
        }
        self.position = (self.position + 1) % self.capacity;
    }

    /// Sample a random batch of transitions, regrouped field-wise.
    ///
    /// Draws `batch_size` distinct transitions uniformly without replacement
    /// and stacks them into `(states, actions, rewards, next_states, dones)`
    /// batch tensors, with row `i` of every field originating from the same
    /// transition.
    ///
    /// Calling this with fewer than `batch_size` populated slots is a caller
    /// error and fails loudly.
    #[allow(clippy::type_complexity)]
    pub fn random_batch(
        &self,
        batch_size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<(Tensor, Tensor, Tensor, Tensor, Tensor)> {
        if self.buffer.len() < batch_size {
            bail!(
                "cannot sample a batch of {batch_size} from a replay buffer holding {}",
                self.buffer.len(),
            );
        }

        let transition_to_tuple =
            |t: &Transition| -> Result<(Tensor, Tensor, Tensor, Tensor, Tensor)> {
                Ok((
                    t.state.unsqueeze(0)?,
                    t.action.unsqueeze(0)?,
                    t.reward.unsqueeze(0)?,
                    t.next_state.unsqueeze(0)?,
                    t.done.unsqueeze(0)?,
                ))
            };

        let (states, actions, rewards, next_states, dones) =
            index::sample(rng, self.buffer.len(), batch_size)
                .into_iter()
                .map(|i| transition_to_tuple(&self.buffer[i]))
                .collect::<Result<Vec<(Tensor, Tensor, Tensor, Tensor, Tensor)>>>()?
                .into_iter()
                .unzip_n_vec();

        Ok((
            Tensor::cat(&states, 0)?,
            Tensor::cat(&actions, 0)?,
            Tensor::cat(&rewards, 0)?,
            Tensor::cat(&next_states, 0)?,
            Tensor::cat(&dones, 0)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        candle_core::Device,
        rand::{
            rngs::StdRng,
            SeedableRng,
        },
    };

    fn labeled_transition(label: f64) -> Transition {
        let device = Device::Cpu;
        Transition::new(
            &Tensor::new(vec![label], &device).unwrap(),
            &Tensor::new(vec![10.0 + label], &device).unwrap(),
            &Tensor::new(vec![100.0 + label], &device).unwrap(),
            &Tensor::new(vec![label + 1.0], &device).unwrap(),
            &Tensor::new(vec![0.0], &device).unwrap(),
        )
    }

    fn slot_labels(buffer: &ReplayBuffer) -> Vec<f64> {
        buffer
            .buffer
            .iter()
            .map(|t| t.state.to_vec1::<f64>().unwrap()[0])
            .collect()
    }

    #[test]
    fn fifo_eviction_wraps_around() {
        let mut buffer = ReplayBuffer::new(5);
        for label in 0..7 {
            buffer.push(labeled_transition(label as f64));
        }

        assert_eq!(buffer.len(), 5);
        assert!(buffer.is_full());
        // slots 0 and 1 were overwritten by transitions 5 and 6
        assert_eq!(slot_labels(&buffer), vec![5.0, 6.0, 2.0, 3.0, 4.0]);
        assert_eq!(buffer.position, 2);
    }

    #[test]
    fn random_batch_has_distinct_rows_with_matching_fields() {
        let mut buffer = ReplayBuffer::new(5);
        for label in 0..5 {
            buffer.push(labeled_transition(label as f64));
        }

        let mut rng = StdRng::seed_from_u64(0);
        let (states, actions, rewards, next_states, dones) =
            buffer.random_batch(3, &mut rng).unwrap();

        assert_eq!(states.dims(), &[3, 1]);
        assert_eq!(dones.dims(), &[3, 1]);

        let states = states.flatten_all().unwrap().to_vec1::<f64>().unwrap();
        let actions = actions.flatten_all().unwrap().to_vec1::<f64>().unwrap();
        let rewards = rewards.flatten_all().unwrap().to_vec1::<f64>().unwrap();
        let next_states = next_states.flatten_all().unwrap().to_vec1::<f64>().unwrap();

        for i in 0..3 {
            // every field of row i comes from the same source transition
            assert_eq!(actions[i], 10.0 + states[i]);
            assert_eq!(rewards[i], 100.0 + states[i]);
            assert_eq!(next_states[i], states[i] + 1.0);
        }

        // sampling is without replacement
        let mut sources = states.clone();
        sources.sort_by(f64::total_cmp);
        sources.dedup();
        assert_eq!(sources.len(), 3);
    }

    #[test]
    fn random_batch_after_wraparound_samples_survivors() {
        let mut buffer = ReplayBuffer::new(5);
        for label in 0..7 {
            buffer.push(labeled_transition(label as f64));
        }

        let mut rng = StdRng::seed_from_u64(1);
        let (states, _, _, _, _) = buffer.random_batch(3, &mut rng).unwrap();
        for label in states.flatten_all().unwrap().to_vec1::<f64>().unwrap() {
            assert!((2.0..=6.0).contains(&label));
        }
    }

    #[test]
    fn random_batch_underflow_is_an_error() {
        let mut buffer = ReplayBuffer::new(5);
        for label in 0..3 {
            buffer.push(labeled_transition(label as f64));
        }

        let mut rng = StdRng::seed_from_u64(2);
        assert!(buffer.random_batch(4, &mut rng).is_err());
    }
}
