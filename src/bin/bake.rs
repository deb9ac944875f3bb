//! Render a song (or a single instrument note) to a 16-bit stereo WAV file

#[cfg(not(target_arch = "wasm32"))]
mod bake {
    use std::path::PathBuf;
    use std::time::Duration;

    use anyhow::{bail, Context, Result};
    use clap::Parser;
    use indicatif::{ProgressBar, ProgressStyle};
    use jamkit::synth::{Job, NoteRender, SampleBuffer, Slice, Song, SongRender, Step, ToStereo, MAX_SLICE_MS, SAMPLE_RATE};

    #[derive(Parser, Debug)]
    #[command(name = "jamkit-bake", version, about = "Render a jamkit song to WAV")]
    struct Args {
        /// Song file (RON). Defaults to the bundled demo song.
        song: Option<PathBuf>,

        /// Output WAV path
        #[arg(short, long, default_value = "song.wav")]
        output: PathBuf,

        /// Noise seed
        #[arg(long, default_value_t = 0x5eed)]
        seed: u64,

        /// Generation slice budget in milliseconds
        #[arg(long, default_value_t = MAX_SLICE_MS)]
        slice_ms: u64,

        /// Render only this note (1-255) of the selected track's instrument
        #[arg(long)]
        note: Option<u8>,

        /// Track whose instrument plays `--note`
        #[arg(long, default_value_t = 0)]
        track: usize,
    }

    /// Drive a job to the end, one slice per tick of the progress bar
    fn run<J: Job>(job: &mut J, bar: &ProgressBar, budget: Duration) -> J::Output {
        loop {
            let step = job.resume(&mut Slice::timed(budget));
            bar.set_position((job.progress() * 1000.0) as u64);
            if let Step::Ready(out) = step {
                return out;
            }
        }
    }

    pub fn main() -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();

        let args = Args::parse();
        let song = match &args.song {
            Some(path) => Song::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => Song::demo().context("loading demo song")?,
        };
        let budget = Duration::from_millis(args.slice_ms.max(1));

        let bar = ProgressBar::new(1000);
        bar.set_style(
            ProgressStyle::with_template("{msg:>10} [{bar:40}] {percent:>3}%")
                .context("progress template")?
                .progress_chars("=> "),
        );

        let master: SampleBuffer = match args.note {
            Some(0) => bail!("note 0 is silence"),
            Some(note) => {
                let Some(track) = song.tracks.get(args.track) else {
                    bail!("song has {} tracks, no track {}", song.tracks.len(), args.track);
                };
                bar.set_message("note");
                run(&mut NoteRender::new(track.instrument, song.row_len(), note, args.seed), &bar, budget)
            }
            None => {
                bar.set_message("song");
                run(&mut SongRender::new(song, args.seed), &bar, budget)
            }
        };

        bar.set_message("convert");
        let stereo = run(&mut ToStereo::new(master), &bar, budget);
        bar.finish_and_clear();

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&args.output, spec)
            .with_context(|| format!("creating {}", args.output.display()))?;
        for sample in stereo.to_i16() {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        log::info!("wrote {} ({:.1} s)", args.output.display(), stereo.duration_secs());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    bake::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
