//! Application host: wires audio input and decoding to the engine and
//! drives the UI event loop.
//!
//! The engine itself is single-threaded; everything asynchronous lands
//! here first. The cpal input callback pushes metering levels into an
//! rtrb ring buffer, the decode worker sends its one-shot result over an
//! mpsc channel tagged with the engine generation, and the event loop
//! applies both from the UI thread.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use rtrb::{Consumer, RingBuffer};

use wavescope::decode::{wav_duration, AmplitudeDecoder, DecodeError, WavDecoder};
use wavescope::{Generation, Mode, VisualConfig, WaveformEngine};

use super::ui;

/// Gain applied to the raw RMS of one input buffer before clamping.
const METER_GAIN: f32 = 6.0;
/// Metering levels buffered between the audio callback and the UI.
const METER_QUEUE: usize = 256;

/// Decode worker result, tagged with the generation captured at spawn.
type DecodeMessage = (Generation, Result<(Vec<f32>, f64), DecodeError>);

pub struct App {
    engine: WaveformEngine,
    meter_rx: Option<Consumer<f32>>,
    _input_stream: Option<cpal::Stream>,
    decode_rx: Option<mpsc::Receiver<DecodeMessage>>,
    track_duration: Option<f64>,
    position: Rc<Cell<f64>>,
    finished: Rc<Cell<bool>>,
    waveform_area: Rect,
    last_tick: Instant,
    should_quit: bool,
}

impl App {
    /// Build a playback app when a path is given, a record app otherwise.
    pub fn new(path: Option<PathBuf>) -> EyreResult<Self> {
        // terminal cells are the view units here, so bars are 1 cell wide
        let config = VisualConfig {
            bar_width: 1.0,
            bar_spacing: 1.0,
            corner_radius: 0.0,
            ..VisualConfig::default()
        };

        let mode = if path.is_some() {
            Mode::Playback
        } else {
            Mode::Record
        };
        let mut engine = WaveformEngine::new(mode, config);

        let position = Rc::new(Cell::new(0.0));
        let position_sink = position.clone();
        engine.subscribe_position(move |t| position_sink.set(t));

        let finished = Rc::new(Cell::new(false));
        let finished_sink = finished.clone();
        engine.on_playback_complete(move || finished_sink.set(true));

        let mut meter_rx = None;
        let mut input_stream = None;
        let mut decode_rx = None;

        match path {
            Some(path) => {
                decode_rx = Some(spawn_decode(path, engine.generation()));
            }
            None => {
                let (producer, consumer) = RingBuffer::<f32>::new(METER_QUEUE);
                input_stream = Some(build_input_stream(producer)?);
                meter_rx = Some(consumer);
            }
        }

        Ok(Self {
            engine,
            meter_rx,
            _input_stream: input_stream,
            decode_rx,
            track_duration: None,
            position,
            finished,
            waveform_area: Rect::default(),
            last_tick: Instant::now(),
            should_quit: false,
        })
    }

    /// Run the UI event loop until quit.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
        let result = self.event_loop(terminal);
        crossterm::execute!(std::io::stdout(), DisableMouseCapture)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_meter();
            self.poll_decode()?;
            self.advance_clock();

            let size = terminal.size()?;
            self.engine
                .set_view_width(size.width.saturating_sub(2) as f32);

            // One draw per pending frame keeps back-to-back requests (the
            // stop pulse) visible; idle loops still repaint once.
            let mut frames: Vec<Option<f32>> = Vec::new();
            while let Some(request) = self.engine.poll_redraw() {
                frames.push(request.gradient);
            }
            if frames.is_empty() {
                frames.push(self.engine.gradient());
            }

            for gradient in frames {
                let status = ui::StatusLine {
                    position: self.position.get(),
                    duration: self.engine.duration().or(self.track_duration),
                    finished: self.finished.get(),
                };
                terminal.draw(|frame| {
                    self.waveform_area = ui::render(frame, &self.engine, gradient, &status);
                })?;
            }

            self.handle_events()?;
        }
        Ok(())
    }

    /// Drain metering levels recorded since the last loop iteration.
    fn poll_meter(&mut self) {
        let Some(rx) = self.meter_rx.as_mut() else {
            return;
        };
        while let Ok(level) = rx.pop() {
            if let Err(err) = self.engine.add_sample(level) {
                log::warn!("dropping metering level: {err}");
            }
        }
    }

    /// Apply a finished decode, if any, and start playback.
    fn poll_decode(&mut self) -> EyreResult<()> {
        let Some(rx) = self.decode_rx.as_ref() else {
            return Ok(());
        };
        match rx.try_recv() {
            Ok((generation, Ok((levels, duration)))) => {
                self.decode_rx = None;
                if self.engine.complete_decode(generation, levels)? {
                    self.track_duration = Some(duration);
                    self.engine.play(duration)?;
                }
            }
            Ok((_, Err(err))) => {
                self.decode_rx = None;
                return Err(err).wrap_err("failed to decode audio file");
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.decode_rx = None;
            }
        }
        Ok(())
    }

    /// Tick the playback clock at the configured interval.
    fn advance_clock(&mut self) {
        let interval = Duration::from_secs_f64(self.engine.config().tick_interval);
        if self.engine.is_playing() && self.last_tick.elapsed() >= interval {
            self.engine.tick();
            self.last_tick = Instant::now();
        }
    }

    fn handle_events(&mut self) -> EyreResult<()> {
        if !event::poll(Duration::from_millis(16))? {
            return Ok(());
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key.code)?,
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> EyreResult<()> {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.toggle_playback()?,
            KeyCode::Char('s') | KeyCode::Char('S') => self.engine.stop(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.finished.set(false);
                self.engine.reset();
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                if self.engine.mode() == Mode::Record {
                    self.engine.rescale()?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn toggle_playback(&mut self) -> EyreResult<()> {
        if self.engine.is_playing() {
            self.engine.pause()?;
        } else if let Some(duration) = self.engine.duration().or(self.track_duration) {
            self.finished.set(false);
            self.engine.play(duration)?;
            self.last_tick = Instant::now();
        }
        Ok(())
    }

    /// Pointer down or drag scrubs; pointer lift needs no action.
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let scrubbing = matches!(
            mouse.kind,
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left)
        );
        if !scrubbing {
            return;
        }

        let area = self.waveform_area;
        if area.width == 0 {
            return;
        }
        let x = mouse.column.saturating_sub(area.x) as f32;
        self.engine.scrub(x, area.width as f32);
    }
}

/// Open the default input device and stream metering levels into `producer`.
fn build_input_stream(mut producer: rtrb::Producer<f32>) -> EyreResult<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| eyre!("no default input device available"))?;
    let config = device
        .default_input_config()
        .wrap_err("failed to fetch default input config")?;

    let stream = device.build_input_stream(
        &config.into(),
        move |data: &[f32], _| {
            if data.is_empty() {
                return;
            }
            let energy = data.iter().map(|s| s * s).sum::<f32>() / data.len() as f32;
            let level = (energy.sqrt() * METER_GAIN).min(1.0);
            // a full queue just drops this level; the next one follows shortly
            let _ = producer.push(level);
        },
        |err| log::warn!("input stream error: {err}"),
        None,
    )?;
    stream.play()?;
    Ok(stream)
}

/// Decode on a worker thread; the result comes back tagged with the
/// generation so the engine can discard it after a reset.
fn spawn_decode(path: PathBuf, generation: Generation) -> mpsc::Receiver<DecodeMessage> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let decoder = WavDecoder::new();
        let result = decoder
            .decode(&path)
            .and_then(|levels| wav_duration(&path).map(|duration| (levels, duration)));
        let _ = tx.send((generation, result));
    });
    rx
}
