//! Buffer sizing and retry configuration shared by both stream kinds.

use crate::stream::stream_error::StreamError;

/// Default initial buffer capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 8192;

/// Default factor by which a buffer grows when it must keep more data.
pub const DEFAULT_GROWTH_FACTOR: usize = 2;

// =#========================================================================#=
// STREAM CONFIG
// =#========================================================================#=
/// Configuration of a buffered stream.
///
/// Buffers start at `capacity` bytes. They only grow when they must keep
/// data they are not allowed to drop: anchored input or output the sink
/// refused to take. Growth multiplies the capacity by `growth_factor` until
/// the data fits, bounded by `max_capacity` if set.
///
/// # Example
/// ```
/// use bufstreams::stream::StreamConfig;
///
/// let config = StreamConfig::default()
///     .with_capacity(4096)
///     .with_growth_factor(4)
///     .with_max_capacity(1 << 20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    capacity: usize,
    growth_factor: usize,
    max_capacity: Option<usize>,
    max_flush_retries: Option<usize>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            max_capacity: None,
            max_flush_retries: None,
        }
    }
}

impl StreamConfig {
    /// Sets the initial buffer capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the factor applied on each growth step.
    pub fn with_growth_factor(mut self, growth_factor: usize) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    /// Bounds buffer growth. Without a bound, anchored data is always kept.
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    /// Makes `flush` give up after `retries` consecutive drains in which the
    /// sink accepted nothing. Without a limit, `flush` retries forever.
    pub fn with_max_flush_retries(mut self, retries: usize) -> Self {
        self.max_flush_retries = Some(retries);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn growth_factor(&self) -> usize {
        self.growth_factor
    }

    pub fn max_capacity(&self) -> Option<usize> {
        self.max_capacity
    }

    pub fn max_flush_retries(&self) -> Option<usize> {
        self.max_flush_retries
    }

    /// Checks that the configuration describes a usable buffer.
    ///
    /// # Errors
    /// * [StreamError::InvalidCapacity] - capacity is zero
    /// * [StreamError::InvalidGrowthFactor] - growth factor below 2
    /// * [StreamError::InvalidMaxCapacity] - maximum below the initial capacity
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.capacity == 0 {
            return Err(StreamError::InvalidCapacity(self.capacity));
        }
        if self.growth_factor < 2 {
            return Err(StreamError::InvalidGrowthFactor(self.growth_factor));
        }
        match self.max_capacity {
            Some(max) if max < self.capacity => Err(StreamError::InvalidMaxCapacity {
                capacity: self.capacity,
                max,
            }),
            _ => Ok(()),
        }
    }

    /// Computes the capacity a buffer of `current` bytes must grow to so
    /// that it holds at least `required` bytes.
    ///
    /// # Errors
    /// [StreamError::CapacityExceeded] if `required` is above the maximum.
    pub(crate) fn grown_capacity(&self, current: usize, required: usize) -> Result<usize, StreamError> {
        let mut capacity = current.max(1);
        while capacity < required {
            capacity = capacity.saturating_mul(self.growth_factor);
        }

        match self.max_capacity {
            Some(max) if required > max => Err(StreamError::CapacityExceeded { required, max }),
            Some(max) => Ok(capacity.min(max)),
            None => Ok(capacity),
        }
    }
}
