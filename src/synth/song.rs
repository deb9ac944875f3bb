//! Song, track and note rendering pipelines

use super::buffer::{word_to_i16, SampleBuffer, BIAS};
use super::delay::DelayPass;
use super::instrument::{Instrument, Song, Track};
use super::slice::{Job, Slice, Step};
use super::voice::SoundGenerator;
use super::{FRAME_BYTES, PATTERN_ROWS};

/// Resumable silence fill, walking from the last word to the first
#[derive(Debug, Clone)]
pub struct FillSilence {
    next: Option<usize>,
    total: usize,
}

impl FillSilence {
    pub fn new(buf: &SampleBuffer) -> Self {
        Self {
            next: buf.len().checked_sub(2),
            total: buf.len() / 2,
        }
    }

    pub fn progress(&self) -> f32 {
        match (self.next, self.total) {
            (_, 0) | (None, _) => 1.0,
            (Some(b), total) => 1.0 - (b / 2 + 1) as f32 / total as f32,
        }
    }

    pub fn run(&mut self, buf: &mut SampleBuffer, slice: &mut Slice) -> bool {
        let bytes = buf.bytes_mut();
        while let Some(b) = self.next {
            bytes[b] = 0;
            bytes[b + 1] = 128;
            self.next = b.checked_sub(2);
            if slice.tick() {
                return self.next.is_none();
            }
        }
        true
    }
}

/// Resumable sum of a channel buffer into the master buffer.
///
/// Words are added with the bias removed once and wrap at 16 bits; there
/// is no clamping at this stage.
#[derive(Debug, Clone, Default)]
pub struct MixPass {
    b: usize,
}

impl MixPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self, len: usize) -> f32 {
        if len == 0 {
            1.0
        } else {
            (self.b as f32 / len as f32).min(1.0)
        }
    }

    pub fn run(&mut self, chn: &SampleBuffer, master: &mut SampleBuffer, slice: &mut Slice) -> bool {
        let len = chn.len().min(master.len());
        while self.b < len {
            let x = master.word(self.b) + chn.word(self.b) - BIAS;
            master.set_word(self.b, x);
            self.b += 2;
            if slice.tick() {
                return self.b >= len;
            }
        }
        true
    }
}

/// Mix a whole channel into the master buffer in one go
pub fn mix_into(chn: &SampleBuffer, master: &mut SampleBuffer) {
    MixPass::new().run(chn, master, &mut Slice::unbounded());
}

#[derive(Debug, Clone)]
enum TrackPhase {
    Alloc(FillSilence),
    Record { slot: usize, row: usize, pos: usize },
    Delay(DelayPass),
    Mix(MixPass),
    Done,
}

/// Renders one track into its own channel buffer, delays it, then mixes
/// it into the master buffer.
///
/// The caller passes the same track and master buffer to every resume.
#[derive(Debug, Clone)]
pub struct TrackRender {
    chn: SampleBuffer,
    gen: SoundGenerator,
    phase: TrackPhase,
    rows: usize,
    end_slot: Option<usize>,
}

impl TrackRender {
    pub fn new(song: &Song, track: &Track, seed: u64) -> Self {
        let chn = SampleBuffer::zeroed(song.frames());
        let phase = TrackPhase::Alloc(FillSilence::new(&chn));
        Self {
            chn,
            gen: SoundGenerator::new(track.instrument, song.row_len(), seed),
            phase,
            rows: song.rows(),
            // end_pattern 0 never reaches a final slot: nothing plays
            end_slot: (song.end_pattern as usize).checked_sub(1),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, TrackPhase::Done)
    }

    pub fn progress(&self) -> f32 {
        match &self.phase {
            TrackPhase::Alloc(fill) => 0.1 * fill.progress(),
            TrackPhase::Record { slot, row, .. } => {
                let played = slot * PATTERN_ROWS + row;
                0.1 + 0.7 * if self.rows == 0 { 1.0 } else { (played as f32 / self.rows as f32).min(1.0) }
            }
            TrackPhase::Delay(delay) => 0.8 + 0.1 * delay.progress(),
            TrackPhase::Mix(mix) => 0.9 + 0.1 * mix.progress(self.chn.len()),
            TrackPhase::Done => 1.0,
        }
    }

    /// Continue rendering; true once the track is mixed into `master`
    pub fn resume(&mut self, track: &Track, master: &mut SampleBuffer, slice: &mut Slice) -> bool {
        loop {
            match &mut self.phase {
                TrackPhase::Alloc(fill) => {
                    if !fill.run(&mut self.chn, slice) {
                        return false;
                    }
                    self.phase = match self.end_slot {
                        Some(_) => TrackPhase::Record { slot: 0, row: 0, pos: 0 },
                        None => self.delay_phase(),
                    };
                }
                TrackPhase::Record { slot, row, pos } => {
                    let Some(end_slot) = self.end_slot else {
                        self.phase = self.delay_phase();
                        continue;
                    };
                    let row_len = self.gen.row_len() as usize;
                    loop {
                        if *row == PATTERN_ROWS {
                            *row = 0;
                            *slot += 1;
                            continue;
                        }
                        if *slot == end_slot {
                            break;
                        }
                        let note = track.note(*slot, *row);
                        if note != 0 {
                            self.gen.gen_sound(note, &mut self.chn, *pos);
                        }
                        *pos += row_len;
                        *row += 1;
                        if slice.tick_checked() {
                            return false;
                        }
                    }
                    self.phase = self.delay_phase();
                }
                TrackPhase::Delay(delay) => {
                    if !delay.run(&mut self.chn, slice) {
                        return false;
                    }
                    self.phase = TrackPhase::Mix(MixPass::new());
                }
                TrackPhase::Mix(mix) => {
                    if !mix.run(&self.chn, master, slice) {
                        return false;
                    }
                    self.phase = TrackPhase::Done;
                }
                TrackPhase::Done => return true,
            }
        }
    }

    fn delay_phase(&self) -> TrackPhase {
        let instr = self.gen.instrument();
        TrackPhase::Delay(DelayPass::new(&instr.delay, self.gen.row_len(), self.chn.frames()))
    }
}

enum SongPhase {
    Alloc(FillSilence),
    Tracks { index: usize, render: Box<TrackRender> },
    Done,
}

/// Renders a whole song into one master buffer. Tracks are rendered
/// strictly one after another.
pub struct SongRender {
    song: Song,
    seed: u64,
    master: Option<SampleBuffer>,
    phase: SongPhase,
    slices: u32,
}

impl SongRender {
    /// `seed` drives the noise oscillators; track `i` uses `seed + i`
    pub fn new(song: Song, seed: u64) -> Self {
        let master = SampleBuffer::zeroed(song.frames());
        let phase = SongPhase::Alloc(FillSilence::new(&master));
        log::info!(
            "rendering song: {} tracks, {} s, row length {}",
            song.tracks.len(),
            song.length_secs,
            song.row_len()
        );
        Self { song, seed, master: Some(master), phase, slices: 0 }
    }

    fn track_render(&self, index: usize) -> SongPhase {
        match self.song.tracks.get(index) {
            Some(track) => SongPhase::Tracks {
                index,
                render: Box::new(TrackRender::new(&self.song, track, self.seed.wrapping_add(index as u64))),
            },
            None => SongPhase::Done,
        }
    }
}

impl Job for SongRender {
    type Output = SampleBuffer;

    fn resume(&mut self, slice: &mut Slice) -> Step<SampleBuffer> {
        self.slices += 1;
        loop {
            let Some(master) = self.master.as_mut() else {
                return Step::Pending;
            };
            match &mut self.phase {
                SongPhase::Alloc(fill) => {
                    if !fill.run(master, slice) {
                        return Step::Pending;
                    }
                    self.phase = self.track_render(0);
                }
                SongPhase::Tracks { index, render } => {
                    let index = *index;
                    let track = &self.song.tracks[index];
                    if !render.resume(track, master, slice) {
                        return Step::Pending;
                    }
                    log::info!("track {}/{} mixed", index + 1, self.song.tracks.len());
                    self.phase = self.track_render(index + 1);
                }
                SongPhase::Done => {
                    log::debug!("song rendered in {} slices", self.slices);
                    return match self.master.take() {
                        Some(master) => Step::Ready(master),
                        None => Step::Pending,
                    };
                }
            }
        }
    }

    fn progress(&self) -> f32 {
        let tracks = self.song.tracks.len().max(1) as f32;
        match &self.phase {
            SongPhase::Alloc(_) => 0.0,
            SongPhase::Tracks { index, render } => (*index as f32 + render.progress()) / tracks,
            SongPhase::Done => 1.0,
        }
    }
}

enum NotePhase {
    Alloc(FillSilence),
    Delay(DelayPass),
    Done,
}

/// Renders a single note of an instrument into its own buffer (a sound
/// effect), with room for the delay tail.
pub struct NoteRender {
    gen: SoundGenerator,
    note: u8,
    buf: Option<SampleBuffer>,
    phase: NotePhase,
}

impl NoteRender {
    pub fn new(instr: Instrument, row_len: u32, note: u8, seed: u64) -> Self {
        let gen = SoundGenerator::new(instr, row_len, seed);
        let buf = SampleBuffer::zeroed(gen.note_frames());
        let phase = NotePhase::Alloc(FillSilence::new(&buf));
        Self { gen, note, buf: Some(buf), phase }
    }
}

impl Job for NoteRender {
    type Output = SampleBuffer;

    fn resume(&mut self, slice: &mut Slice) -> Step<SampleBuffer> {
        loop {
            let Some(buf) = self.buf.as_mut() else {
                return Step::Pending;
            };
            match &mut self.phase {
                NotePhase::Alloc(fill) => {
                    if !fill.run(buf, slice) {
                        return Step::Pending;
                    }
                    // The note itself is rendered in one go
                    self.gen.gen_sound(self.note, buf, 0);
                    let instr = self.gen.instrument();
                    self.phase = NotePhase::Delay(DelayPass::new(&instr.delay, self.gen.row_len(), buf.frames()));
                }
                NotePhase::Delay(delay) => {
                    if !delay.run(buf, slice) {
                        return Step::Pending;
                    }
                    self.phase = NotePhase::Done;
                }
                NotePhase::Done => {
                    return match self.buf.take() {
                        Some(buf) => Step::Ready(buf),
                        None => Step::Pending,
                    };
                }
            }
        }
    }

    fn progress(&self) -> f32 {
        match &self.phase {
            NotePhase::Alloc(fill) => 0.5 * fill.progress(),
            NotePhase::Delay(delay) => 0.5 + 0.5 * delay.progress(),
            NotePhase::Done => 1.0,
        }
    }
}

/// Playable stereo audio: interleaved left/right samples in `[-1, 1)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoBuffer {
    pub samples: Vec<f32>,
}

impl StereoBuffer {
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn frame(&self, frame: usize) -> (f32, f32) {
        (self.samples[frame * 2], self.samples[frame * 2 + 1])
    }

    /// Interleaved 16-bit PCM, e.g. for WAV export
    pub fn to_i16(&self) -> Vec<i16> {
        self.samples
            .iter()
            .map(|&s| (s * 32768.0).clamp(-32768.0, 32767.0) as i16)
            .collect()
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / super::SAMPLE_RATE as f32
    }
}

/// Resumable conversion of a biased master buffer to [`StereoBuffer`].
///
/// Each word becomes `clamp(4 * (w - 32768)) / 32768`.
pub struct ToStereo {
    src: SampleBuffer,
    out: Option<StereoBuffer>,
    frame: usize,
}

impl ToStereo {
    pub fn new(src: SampleBuffer) -> Self {
        let frames = src.frames();
        Self {
            src,
            out: Some(StereoBuffer { samples: Vec::with_capacity(frames * 2) }),
            frame: 0,
        }
    }
}

impl Job for ToStereo {
    type Output = StereoBuffer;

    fn resume(&mut self, slice: &mut Slice) -> Step<StereoBuffer> {
        let Some(out) = self.out.as_mut() else {
            return Step::Pending;
        };
        let frames = self.src.frames();
        while self.frame < frames {
            let b = self.frame * FRAME_BYTES;
            out.samples.push(word_to_i16(self.src.word(b)) as f32 / 32768.0);
            out.samples.push(word_to_i16(self.src.word(b + 2)) as f32 / 32768.0);
            self.frame += 1;
            if slice.tick() && self.frame < frames {
                return Step::Pending;
            }
        }
        match self.out.take() {
            Some(out) => Step::Ready(out),
            None => Step::Pending,
        }
    }

    fn progress(&self) -> f32 {
        match self.src.frames() {
            0 => 1.0,
            frames => self.frame as f32 / frames as f32,
        }
    }
}
