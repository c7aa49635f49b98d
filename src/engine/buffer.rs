use super::types::Sample;

/// Time-ordered samples for one recording session or the rolling recognition window.
#[derive(Clone, Debug)]
pub struct GestureBuffer {
    samples: Vec<Sample>,
    max_span_ms: u64,
    max_samples: usize,
}

impl GestureBuffer {
    pub fn new(max_span_ms: u64, max_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_samples),
            max_span_ms,
            max_samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.samples.first().map(|s| s.t_ms)
    }

    pub fn span_ms(&self) -> u64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.t_ms - first.t_ms,
            _ => 0,
        }
    }

    /// True once the buffer holds a full window by duration or by count.
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.max_samples || self.span_ms() >= self.max_span_ms
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn take(&mut self) -> Vec<Sample> {
        std::mem::take(&mut self.samples)
    }

    /// Appends to a recording. Callers stop appending once `is_full` holds.
    pub fn append(&mut self, sample: Sample) {
        self.assert_follows(&sample);
        assert!(
            self.samples.len() < self.max_samples,
            "recording buffer overflow: {} samples, cap {}",
            self.samples.len(),
            self.max_samples
        );
        if let Some(start) = self.started_at_ms() {
            assert!(
                sample.t_ms - start <= self.max_span_ms,
                "recording buffer span overflow: {} ms, cap {} ms",
                sample.t_ms - start,
                self.max_span_ms
            );
        }
        self.samples.push(sample);
    }

    /// Appends to the rolling window, evicting the oldest samples so the window
    /// stays within the span and count caps.
    pub fn append_rolling(&mut self, sample: Sample) {
        self.assert_follows(&sample);

        let overflow = (self.samples.len() + 1).saturating_sub(self.max_samples);
        let stale = self
            .samples
            .iter()
            .skip(overflow)
            .take_while(|old| sample.t_ms - old.t_ms > self.max_span_ms)
            .count();
        self.samples.drain(..overflow + stale);
        self.samples.push(sample);

        debug_assert!(self.samples.len() <= self.max_samples);
        debug_assert!(self.span_ms() <= self.max_span_ms);
    }

    fn assert_follows(&self, sample: &Sample) {
        if let Some(last) = self.samples.last() {
            assert!(
                sample.t_ms > last.t_ms,
                "gesture buffer requires increasing time: {} after {}",
                sample.t_ms,
                last.t_ms
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(t_ms: u64) -> Sample {
        Sample::new((0.0, 0.0, 0.0), (t_ms as f64, 0.0, 0.0), t_ms)
    }

    #[test]
    fn rolling_window_evicts_by_span() {
        let mut buffer = GestureBuffer::new(100, 64);
        for t in (0..=300).step_by(20) {
            buffer.append_rolling(at(t));
        }
        assert_eq!(buffer.span_ms(), 100);
        assert_eq!(buffer.started_at_ms(), Some(200));
        assert_eq!(buffer.len(), 6);
    }

    #[test]
    fn rolling_window_evicts_by_count() {
        let mut buffer = GestureBuffer::new(10_000, 4);
        for t in 1..=10 {
            buffer.append_rolling(at(t));
        }
        let times: Vec<u64> = buffer.samples().iter().map(|s| s.t_ms).collect();
        assert_eq!(times, vec![7, 8, 9, 10]);
    }

    #[test]
    fn recording_reports_full_at_span() {
        let mut buffer = GestureBuffer::new(100, 64);
        for t in (0..100).step_by(20) {
            buffer.append(at(t));
            assert!(!buffer.is_full());
        }
        buffer.append(at(100));
        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 6);
        assert_eq!(buffer.take().len(), 6);
        assert!(buffer.is_empty());
    }

    #[test]
    #[should_panic(expected = "increasing time")]
    fn out_of_order_append_is_a_bug() {
        let mut buffer = GestureBuffer::new(100, 8);
        buffer.append(at(10));
        buffer.append(at(10));
    }

    #[test]
    #[should_panic(expected = "span overflow")]
    fn recording_past_span_is_a_bug() {
        let mut buffer = GestureBuffer::new(100, 64);
        buffer.append(at(0));
        buffer.append(at(101));
    }

    #[test]
    #[should_panic(expected = "overflow")]
    fn recording_past_cap_is_a_bug() {
        let mut buffer = GestureBuffer::new(10_000, 2);
        buffer.append(at(1));
        buffer.append(at(2));
        buffer.append(at(3));
    }
}
