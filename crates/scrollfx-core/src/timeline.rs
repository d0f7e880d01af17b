//! Scroll timeline: maps a trigger element's position to a 0..1 progress and
//! schedules component targets as overlapping segments of that range.
//!
//! The director only writes targets through a [`TargetSink`]; smoothing and
//! rendering happen downstream on the next frame tick.

use fnv::FnvHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::PROGRESS_EPSILON;
use crate::ease::{lerp, Easing};
use crate::error::{FxError, FxResult, SkipReason};
use crate::lerp::UniformField;
use crate::measure::Measure;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SegmentTarget {
    /// Interpolate a scalar uniform from `from` to `to`.
    Uniform {
        component: String,
        field: UniformField,
        from: f32,
        to: f32,
    },
    Color {
        component: String,
        from: [f32; 3],
        to: [f32; 3],
    },
    /// Node `revealed` flag; on while local progress is above zero.
    Reveal { node: String },
    /// Particle field morphs while on and disperses when switched off.
    Morph { component: String },
    /// Opens a spinner's start gate while on.
    Start { component: String },
    /// One-shot fired when the segment start is crossed going forward.
    Fire { component: String },
}

impl SegmentTarget {
    pub fn component(&self) -> &str {
        match self {
            SegmentTarget::Uniform { component, .. }
            | SegmentTarget::Color { component, .. }
            | SegmentTarget::Morph { component }
            | SegmentTarget::Start { component }
            | SegmentTarget::Fire { component } => component,
            SegmentTarget::Reveal { node } => node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSegment {
    pub start: f32,
    pub end: f32,
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub targets: Vec<SegmentTarget>,
    /// `Fire` targets still fire when a fast scroll jumps over the whole
    /// segment in one tick.
    #[serde(default)]
    pub non_skippable: bool,
}

impl TimelineSegment {
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            start,
            end,
            easing: Easing::Linear,
            targets: Vec::new(),
            non_skippable: false,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_target(mut self, target: SegmentTarget) -> Self {
        self.targets.push(target);
        self
    }

    pub fn non_skippable(mut self) -> Self {
        self.non_skippable = true;
        self
    }

    pub fn contains(&self, p: f32) -> bool {
        p >= self.start && p <= self.end
    }

    /// Local progress of `p` within the segment, clamped to `[0, 1]`.
    /// Instantaneous segments are either fully before or fully after.
    pub fn local(&self, p: f32) -> f32 {
        let span = self.end - self.start;
        if span <= PROGRESS_EPSILON {
            return if p >= self.start { 1.0 } else { 0.0 };
        }
        ((p - self.start) / span).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    segments: Vec<TimelineSegment>,
    pub reset_on_reverse_complete: bool,
}

impl Timeline {
    /// Validate and order segments by start.
    pub fn new(mut segments: Vec<TimelineSegment>) -> FxResult<Self> {
        for (i, s) in segments.iter().enumerate() {
            if !(s.start.is_finite() && s.end.is_finite()) {
                return Err(FxError::invalid_segment(i, "bounds must be finite"));
            }
            if !(0.0..=1.0).contains(&s.start) || !(0.0..=1.0).contains(&s.end) {
                return Err(FxError::invalid_segment(
                    i,
                    format!("bounds {}..{} outside [0, 1]", s.start, s.end),
                ));
            }
            if s.start > s.end {
                return Err(FxError::invalid_segment(
                    i,
                    format!("start {} after end {}", s.start, s.end),
                ));
            }
            if let Easing::Power(k) = s.easing {
                if !(k.is_finite() && k > 0.0) {
                    return Err(FxError::invalid_segment(i, "power easing needs k > 0"));
                }
            }
        }
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        Ok(Self {
            segments,
            reset_on_reverse_complete: false,
        })
    }

    pub fn with_reset_on_reverse_complete(mut self, on: bool) -> Self {
        self.reset_on_reverse_complete = on;
        self
    }

    pub fn segments(&self) -> &[TimelineSegment] {
        &self.segments
    }
}

/// Flag-style targets share one write shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Reveal,
    Morph,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetWrite<'a> {
    Uniform {
        component: &'a str,
        field: UniformField,
        value: f32,
    },
    Color {
        component: &'a str,
        value: Vec3,
    },
    Flag {
        kind: FlagKind,
        id: &'a str,
        value: bool,
    },
    Fire {
        component: &'a str,
        /// The whole segment was jumped over in one tick.
        skipped_through: bool,
    },
}

/// Receives the director's writes.
pub trait TargetSink {
    fn write(&mut self, write: TargetWrite<'_>);

    /// Progress came back to exactly 0 on a timeline that resets there.
    fn reverse_complete(&mut self) {}
}

/// Trigger element and the viewport line its progress is measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollTrigger {
    pub element_id: String,
    /// Fraction of the viewport height, from the top.
    #[serde(default = "default_reference_line")]
    pub reference_line: f32,
}

fn default_reference_line() -> f32 {
    0.5
}

impl ScrollTrigger {
    pub fn new(element_id: impl Into<String>, reference_line: f32) -> Self {
        Self {
            element_id: element_id.into(),
            reference_line,
        }
    }
}

/// `clamp((reference - top) / height, 0, 1)`, or `None` when the element has
/// no usable height yet.
pub fn scroll_progress(reference_px: f32, top: f32, height: f32) -> Option<f32> {
    if !(height.is_finite() && height > 0.0) || !top.is_finite() || !reference_px.is_finite() {
        return None;
    }
    Some(((reference_px - top) / height).clamp(0.0, 1.0))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub progress: f32,
    /// `Fire` writes issued.
    pub fired: usize,
    pub reverse_completed: bool,
    /// False when progress was unchanged and nothing was written.
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Crossing {
    Fire,
    Settle,
}

pub struct Director {
    trigger: ScrollTrigger,
    timeline: Timeline,
    last: Option<f32>,
    flags: FnvHashMap<(usize, usize), bool>,
}

impl Director {
    pub fn new(trigger: ScrollTrigger, timeline: Timeline) -> Self {
        Self {
            trigger,
            timeline,
            last: None,
            flags: FnvHashMap::default(),
        }
    }

    pub fn trigger(&self) -> &ScrollTrigger {
        &self.trigger
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Last applied progress.
    pub fn progress(&self) -> Option<f32> {
        self.last
    }

    /// Measure the trigger element and apply the resulting progress. Skips
    /// without writing anything when layout is not usable.
    pub fn evaluate(
        &mut self,
        measure: &dyn Measure,
        sink: &mut dyn TargetSink,
    ) -> Result<Evaluation, SkipReason> {
        let viewport = measure.viewport();
        if !viewport.is_ready() {
            return Err(SkipReason::MeasurementNotReady);
        }
        let rect = measure
            .measure(&self.trigger.element_id)
            .ok_or(SkipReason::MissingReference)?;
        let reference = self.trigger.reference_line * viewport.height;
        let progress =
            scroll_progress(reference, rect.top, rect.height).ok_or(SkipReason::MeasurementNotReady)?;
        Ok(self.apply_progress(progress, sink))
    }

    pub fn apply_progress(&mut self, progress: f32, sink: &mut dyn TargetSink) -> Evaluation {
        let p = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            self.last.unwrap_or(0.0)
        };
        let prev = self.last;
        if prev == Some(p) {
            return Evaluation {
                progress: p,
                fired: 0,
                reverse_completed: false,
                changed: false,
            };
        }
        self.last = Some(p);

        let segments = &self.timeline.segments;
        let flags = &mut self.flags;
        let mut fired = 0;

        match prev {
            None => {
                // Landed mid-page: settle what is already behind, fire nothing.
                for (i, seg) in segments.iter().enumerate() {
                    if seg.end < p {
                        apply_segment(i, seg, 1.0, flags, sink);
                    }
                }
            }
            Some(prev) if p > prev => {
                let mut events: Vec<(f32, Crossing, usize)> = Vec::new();
                for (i, seg) in segments.iter().enumerate() {
                    if prev <= seg.start && seg.start < p {
                        events.push((seg.start, Crossing::Fire, i));
                    }
                    if prev < seg.end && seg.end < p {
                        events.push((seg.end, Crossing::Settle, i));
                    }
                }
                events.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                for (_, kind, i) in events {
                    let seg = &segments[i];
                    match kind {
                        Crossing::Fire => fired += fire_segment(seg, prev, p, sink),
                        Crossing::Settle => apply_segment(i, seg, 1.0, flags, sink),
                    }
                }
            }
            Some(prev) => {
                let mut crossed: Vec<usize> = segments
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| p < s.start && s.start < prev)
                    .map(|(i, _)| i)
                    .collect();
                crossed.sort_by(|a, b| segments[*b].start.total_cmp(&segments[*a].start));
                for i in crossed {
                    apply_segment(i, &segments[i], 0.0, flags, sink);
                }
            }
        }

        for (i, seg) in segments.iter().enumerate() {
            if seg.contains(p) {
                apply_segment(i, seg, seg.local(p), flags, sink);
            }
        }

        let reverse_completed = self.timeline.reset_on_reverse_complete
            && p == 0.0
            && prev.is_some_and(|prev| prev > 0.0);
        if reverse_completed {
            log::debug!("timeline reverse complete on `{}`", self.trigger.element_id);
            self.flags.clear();
            sink.reverse_complete();
        }

        Evaluation {
            progress: p,
            fired,
            reverse_completed,
            changed: true,
        }
    }

    /// Forget the last progress so the next evaluation behaves like the
    /// first one.
    pub fn rewind(&mut self) {
        self.last = None;
        self.flags.clear();
    }
}

fn apply_segment(
    index: usize,
    seg: &TimelineSegment,
    local: f32,
    flags: &mut FnvHashMap<(usize, usize), bool>,
    sink: &mut dyn TargetSink,
) {
    let e = seg.easing.apply(local);
    for (t, target) in seg.targets.iter().enumerate() {
        match target {
            SegmentTarget::Uniform {
                component,
                field,
                from,
                to,
            } => sink.write(TargetWrite::Uniform {
                component,
                field: *field,
                value: lerp(*from, *to, e),
            }),
            SegmentTarget::Color {
                component,
                from,
                to,
            } => sink.write(TargetWrite::Color {
                component,
                value: Vec3::from_array(*from).lerp(Vec3::from_array(*to), e),
            }),
            SegmentTarget::Reveal { node } => {
                write_flag(flags, (index, t), FlagKind::Reveal, node, local, sink)
            }
            SegmentTarget::Morph { component } => {
                write_flag(flags, (index, t), FlagKind::Morph, component, local, sink)
            }
            SegmentTarget::Start { component } => {
                write_flag(flags, (index, t), FlagKind::Start, component, local, sink)
            }
            SegmentTarget::Fire { .. } => {}
        }
    }
}

fn write_flag(
    flags: &mut FnvHashMap<(usize, usize), bool>,
    key: (usize, usize),
    kind: FlagKind,
    id: &str,
    local: f32,
    sink: &mut dyn TargetSink,
) {
    let value = local > 0.0;
    let prev = flags.insert(key, value).unwrap_or(false);
    if prev != value {
        sink.write(TargetWrite::Flag { kind, id, value });
    }
}

/// Issue the segment's `Fire` targets for a forward crossing of its start.
fn fire_segment(seg: &TimelineSegment, prev: f32, p: f32, sink: &mut dyn TargetSink) -> usize {
    let skipped_through = prev <= seg.start && seg.end < p && seg.end > seg.start;
    if skipped_through && !seg.non_skippable {
        return 0;
    }
    let mut n = 0;
    for target in &seg.targets {
        if let SegmentTarget::Fire { component } = target {
            sink.write(TargetWrite::Fire {
                component,
                skipped_through,
            });
            n += 1;
        }
    }
    n
}
