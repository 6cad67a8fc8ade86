//! Narration transcripts and time-proportional subtitle segments.
//!
//! Segment boundaries are proportional to each line's word count over the
//! best duration estimate available. The authoritative audio duration can
//! arrive well after a room starts; segments rebuild when it drifts more
//! than [`DURATION_DRIFT_EPSILON`] from the estimate they were built with.

use log::debug;

const WORDS_PER_SECOND: f64 = 2.6;
const SECONDS_PER_LINE_FLOOR: f64 = 2.4;
const DURATION_DRIFT_EPSILON: f64 = 0.25;

pub fn transcript(room_id: &str) -> &'static [&'static str] {
    match room_id {
        "room1" => &[
            "My current approach to engineering design focuses on understanding problems before attempting to solve them.",
            "Instead of following fixed procedures, I question assumptions, reason from first principles, simplify complexity, and learn through iteration.",
            "I am drawn to this kind of work because it turns uncertainty into clarity and ideas into meaningful impact.",
            "I value clarity over complexity, accessibility over exclusivity, and progress over perfection, and I strive to build solutions that are both technically effective and widely useful.",
        ],
        "room2" => &[
            "I value questioning assumptions because I have learned that many perceived limitations are based on convention rather than evidence.",
            "When I wanted to build a quantitative trading platform, the common belief was that someone without institutional data or formal finance training could not succeed.",
            "Instead of accepting this, I treated it as a hypothesis to test.",
            "By studying market behavior and reframing the problem to focus on high-probability entry conditions, I built and evaluated my own system through disciplined backtesting.",
            "This experience taught me to approach problems with greater humility, recognize what I did not yet understand, and refine my goals rather than accept what is considered impossible.",
        ],
        "room3" => &[
            "My work on CellScope reflected a shift in how I approach engineering.",
            "Guided by accessibility, I used software to turn simple images into clear, high-resolution results.",
            "Returning to first principles let me design the optical layout, CAD structure, and reconstruction pipeline.",
            "That process taught me to identify what truly limits progress rather than copy existing designs.",
            "I now focus on fundamental constraints - cost, accessibility, and usability - when approaching new problems.",
        ],
        "room4" => &[
            "As CellScope evolved, I learned the importance of simplicity in engineering design.",
            "Early versions of the image-processing system kept adding correction steps to improve quality, but the system became slow, fragile, and difficult to understand.",
            "By stepping back and simplifying the core model, I focused on solving the root problem instead of stacking fixes.",
            "The result was a cleaner, faster system with fewer assumptions and fewer points of failure.",
            "This experience taught me that simplicity is not about doing less work, but about understanding a system deeply enough to remove what is unnecessary without losing what matters.",
        ],
        "room5" => &[
            "Hackathons further shaped how I approach uncertainty and idea development in engineering design.",
            "During Hack the North, Canada's largest hackathon, my team explored four to five different project ideas before committing to an Augmented Reality pose reference tool for artists.",
            "Instead of waiting for a perfect idea, we treated each concept as a prototype - quickly building, testing, and discarding ideas based on real feedback.",
            "This taught me that progress comes from action, not hesitation.",
            "By moving quickly and learning through experimentation, we were able to identify what was technically feasible and genuinely useful.",
            "Once a clear direction emerged, we refined the system into a real-time pipeline with inverse kinematics, temporal filtering, and a scalable cloud backend.",
            "This experience reinforced my belief that speed and iteration are essential in engineering design.",
            "When paired with reflection, rapid development turns uncertainty into insight and allows ideas to evolve into practical solutions.",
        ],
        "room6" => &[
            "Across these experiences, my understanding of engineering has shifted from focusing on outcomes to focusing on interpretation and growth.",
            "I now see design as a way of understanding constraints, trade-offs, and human needs, rather than simply producing technical solutions.",
            "While I still value speed and efficiency, I have learned the importance of reflection, clarity, and purposeful decision-making.",
            "Most importantly, these experiences have reshaped how I see myself - not just as someone who builds systems, but as someone who learns through uncertainty, questions assumptions, and uses engineering as a tool to create meaningful impact for others.",
        ],
        _ => &[],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleSegment {
    pub text: &'static str,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Default)]
pub struct SubtitleSynchronizer {
    room_id: Option<String>,
    segments: Vec<SubtitleSegment>,
    active_index: Option<usize>,
    duration_used: Option<f64>,
}

impl SubtitleSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the synchronizer to a room's transcript, building segments with
    /// the best duration estimate available right now.
    pub fn set_active_room(&mut self, room_id: &str, known_duration: Option<f64>) {
        self.room_id = Some(room_id.to_string());
        self.segments = build_segments(transcript(room_id), known_duration);
        self.active_index = None;
        self.duration_used = known_duration;
    }

    /// Advances the active line for the given playback position. Returns
    /// true when the displayed line changed.
    pub fn tick(&mut self, position: f64, latest_duration: Option<f64>) -> bool {
        let Some(room_id) = self.room_id.clone() else {
            return false;
        };
        if self.segments.is_empty() {
            return false;
        }

        if let Some(latest) = latest_duration {
            let drifted = match self.duration_used {
                None => true,
                Some(used) => (latest - used).abs() > DURATION_DRIFT_EPSILON,
            };
            if drifted {
                debug!("rebuilding subtitle segments for {room_id} with duration {latest:.2}");
                self.segments = build_segments(transcript(&room_id), Some(latest));
                self.duration_used = Some(latest);
                self.active_index = None;
            }
        }

        let position = position.max(0.0);
        let new_index = active_segment_index(&self.segments, position);
        if new_index != self.active_index {
            self.active_index = new_index;
            return true;
        }
        false
    }

    pub fn active_line(&self) -> Option<&'static str> {
        self.active_index
            .and_then(|index| self.segments.get(index))
            .map(|segment| segment.text)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn segments(&self) -> &[SubtitleSegment] {
        &self.segments
    }
}

fn build_segments(lines: &'static [&'static str], duration: Option<f64>) -> Vec<SubtitleSegment> {
    if lines.is_empty() {
        return Vec::new();
    }

    let word_counts: Vec<usize> = lines.iter().map(|line| count_words(line)).collect();
    let total_words: usize = word_counts.iter().sum();
    let fallback =
        (lines.len() as f64 * SECONDS_PER_LINE_FLOOR).max(total_words as f64 / WORDS_PER_SECOND);
    let total_duration = match duration {
        Some(value) if value > 0.0 => value,
        _ => fallback,
    };

    let mut cursor = 0.0;
    lines
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let share = if total_words > 0 {
                word_counts[index] as f64 / total_words as f64
            } else {
                1.0 / lines.len() as f64
            };
            let start = cursor;
            // Pin the final boundary so float accumulation cannot leave a
            // trailing gap.
            let end = if index == lines.len() - 1 {
                total_duration
            } else {
                cursor + share * total_duration
            };
            cursor = end;
            SubtitleSegment { text, start, end }
        })
        .collect()
}

fn active_segment_index(segments: &[SubtitleSegment], position: f64) -> Option<usize> {
    let last = segments.last()?;
    if position >= last.end {
        return None;
    }
    segments
        .iter()
        .position(|segment| position >= segment.start && position < segment.end)
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_partition_known_duration_proportionally() {
        let mut sync = SubtitleSynchronizer::new();
        sync.set_active_room("room1", Some(60.0));
        let segments = sync.segments();
        let lines = transcript("room1");
        assert_eq!(segments.len(), lines.len());

        let total_words: usize = lines.iter().map(|line| count_words(line)).sum();
        for (segment, line) in segments.iter().zip(lines) {
            let expected = 60.0 * count_words(line) as f64 / total_words as f64;
            assert!(
                ((segment.end - segment.start) - expected).abs() < 1e-6,
                "segment span should be word-proportional"
            );
        }

        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "segments must be contiguous");
        }
        assert_eq!(segments.first().unwrap().start, 0.0);
        assert_eq!(segments.last().unwrap().end, 60.0);
    }

    #[test]
    fn active_line_follows_position() {
        let mut sync = SubtitleSynchronizer::new();
        sync.set_active_room("room1", Some(40.0));
        assert!(sync.active_line().is_none());

        assert!(sync.tick(0.1, Some(40.0)));
        assert_eq!(sync.active_index(), Some(0));

        // Within the same segment: no display change.
        assert!(!sync.tick(0.2, Some(40.0)));

        // Past the final boundary: back to none.
        assert!(sync.tick(40.0, Some(40.0)));
        assert!(sync.active_line().is_none());
    }

    #[test]
    fn late_duration_rebuilds_segments() {
        let mut sync = SubtitleSynchronizer::new();
        sync.set_active_room("room2", None);
        let heuristic_end = sync.segments().last().unwrap().end;

        sync.tick(1.0, Some(heuristic_end + 5.0));
        assert_eq!(sync.segments().last().unwrap().end, heuristic_end + 5.0);

        // Sub-epsilon drift must not thrash the segment list.
        let settled_end = sync.segments().last().unwrap().end;
        sync.tick(2.0, Some(settled_end + 0.1));
        assert_eq!(sync.segments().last().unwrap().end, settled_end);
    }

    #[test]
    fn heuristic_duration_uses_line_and_word_floors() {
        let mut sync = SubtitleSynchronizer::new();
        sync.set_active_room("room1", None);
        let lines = transcript("room1");
        let total_words: usize = lines.iter().map(|line| count_words(line)).sum();
        let expected =
            (lines.len() as f64 * 2.4).max(total_words as f64 / 2.6);
        assert!((sync.segments().last().unwrap().end - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_transcript_never_activates() {
        let mut sync = SubtitleSynchronizer::new();
        sync.set_active_room("unknown-room", Some(30.0));
        assert!(!sync.tick(1.0, Some(30.0)));
        assert!(sync.active_line().is_none());
    }
}
