//! Per-frame voice activity and its morphological cleanup.

/// Speech/no-speech decision for each fixed-length frame of reference audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceActivity {
    data: Vec<bool>,
    frame_ms: u32,
}

impl VoiceActivity {
    pub fn new(data: Vec<bool>, frame_ms: u32) -> Self {
        Self { data, frame_ms }
    }

    pub fn frames(&self) -> &[bool] {
        &self.data
    }

    pub fn frame_ms(&self) -> u32 {
        self.frame_ms
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of frames classified as speech.
    pub fn active_frames(&self) -> usize {
        self.data.iter().filter(|&&active| active).count()
    }

    /// Removes isolated blips and fills short gaps.
    ///
    /// An opening with `opening_radius` drops speech runs shorter than
    /// `2r + 1` frames; a closing with `closing_radius` then fills silent
    /// gaps of the same size. A radius of zero skips that step.
    pub fn clean(self, opening_radius: usize, closing_radius: usize) -> Self {
        let mut data = self.data;
        if opening_radius > 0 {
            data = padded(&data, opening_radius, |d, r| dilation(&erosion(d, r), r));
        }
        if closing_radius > 0 {
            data = padded(&data, closing_radius, |d, r| erosion(&dilation(d, r), r));
        }
        Self {
            data,
            frame_ms: self.frame_ms,
        }
    }
}

/// Runs `op` over `data` surrounded by `radius` silent frames on each side.
fn padded(data: &[bool], radius: usize, op: impl Fn(&[bool], usize) -> Vec<bool>) -> Vec<bool> {
    let mut input = vec![false; radius];
    input.extend_from_slice(data);
    input.resize(data.len() + 2 * radius, false);

    let output = op(&input, radius);
    output[radius..radius + data.len()].to_vec()
}

fn dilation(input: &[bool], radius: usize) -> Vec<bool> {
    let mut output = input.to_vec();
    for i in radius..input.len().saturating_sub(radius) {
        if !input[i] {
            output[i] = (1..=radius).any(|j| input[i - j] || input[i + j]);
        }
    }
    output
}

fn erosion(input: &[bool], radius: usize) -> Vec<bool> {
    let mut output = input.to_vec();
    for i in radius..input.len().saturating_sub(radius) {
        if input[i] {
            output[i] = (1..=radius).all(|j| input[i - j] && input[i + j]);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(pattern: &str) -> VoiceActivity {
        VoiceActivity::new(pattern.chars().map(|c| c == '#').collect(), 30)
    }

    fn render(voice: &VoiceActivity) -> String {
        voice
            .frames()
            .iter()
            .map(|&a| if a { '#' } else { '.' })
            .collect()
    }

    #[test]
    fn test_zero_radius_is_identity() {
        let voice = activity("..#..###.#");
        assert_eq!(voice.clone().clean(0, 0), voice);
    }

    #[test]
    fn test_opening_removes_short_blips() {
        let cleaned = activity("..#....#####...").clean(1, 0);
        assert_eq!(render(&cleaned), ".......#####...");
    }

    #[test]
    fn test_closing_fills_short_gaps() {
        let cleaned = activity("..###.###......").clean(0, 1);
        assert_eq!(render(&cleaned), "..#######......");
    }

    #[test]
    fn test_clean_keeps_length_and_frame_size() {
        let cleaned = activity("#.#.#").clean(2, 2);
        assert_eq!(cleaned.len(), 5);
        assert_eq!(cleaned.frame_ms(), 30);
    }

    #[test]
    fn test_clean_handles_short_input() {
        let cleaned = activity("#").clean(3, 3);
        assert_eq!(cleaned.len(), 1);
        let empty = activity("").clean(2, 2);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_active_frames() {
        assert_eq!(activity("#..##").active_frames(), 3);
    }
}
