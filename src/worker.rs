//! Dedicated playback thread driven over a command channel.
//!
//! The thread owns the [`Player`] and its output. While a song is playing it
//! wakes every `poll` interval to tick; while idle it blocks on the channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context};
use log::{error, info};

use crate::error::{Result, RtttlError};
use crate::output::{Clock, ToneOutput};
use crate::player::{Player, Tick};

/// Stack for the playback thread. ESP-IDF's default pthread stack is small.
const STACK_SIZE: usize = 8 * 1024;

type Reply = Sender<Result<()>>;

enum Command {
    Load {
        song: &'static str,
        volume: u8,
        reply: Reply,
    },
    Start(Reply),
    Stop(Reply),
    Shutdown,
}

/// Last error raised by a background tick, kept until the caller takes it.
type Failure = Arc<Mutex<Option<RtttlError>>>;

/// Handle to a running playback thread. Dropping it stops the thread.
pub struct PlayerHandle {
    tx: Sender<Command>,
    playing: Arc<AtomicBool>,
    failure: Failure,
    thread: Option<JoinHandle<()>>,
}

/// Spawn the playback thread.
pub fn spawn<O, C>(output: O, clock: C, poll: Duration) -> anyhow::Result<PlayerHandle>
where
    O: ToneOutput + Send + 'static,
    C: Clock + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let playing = Arc::new(AtomicBool::new(false));
    let flag = playing.clone();
    let failure = Failure::default();
    let failed = failure.clone();

    let thread = thread::Builder::new()
        .name("rtttl".into())
        .stack_size(STACK_SIZE)
        .spawn(move || run(Player::new(output), clock, poll, rx, flag, failed))
        .context("failed to spawn playback thread")?;

    Ok(PlayerHandle {
        tx,
        playing,
        failure,
        thread: Some(thread),
    })
}

fn run<O: ToneOutput, C: Clock>(
    mut player: Player<'static, O>,
    clock: C,
    poll: Duration,
    rx: Receiver<Command>,
    playing: Arc<AtomicBool>,
    failure: Failure,
) {
    loop {
        let cmd = if player.is_playing() {
            match rx.recv_timeout(poll) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            }
        };

        let replied = match cmd {
            None => {
                match player.tick(clock.now_millis()) {
                    Ok(Tick::Finished) => info!("playback finished"),
                    Ok(_) => {}
                    Err(e) => {
                        error!("playback stopped: {e}");
                        if let Ok(mut slot) = failure.lock() {
                            *slot = Some(e);
                        }
                    }
                }
                None
            }
            Some(Command::Load {
                song,
                volume,
                reply,
            }) => Some((reply, player.load_with_volume(song, volume))),
            Some(Command::Start(reply)) => {
                if let Ok(mut slot) = failure.lock() {
                    *slot = None;
                }
                // First note goes out now rather than after one poll
                let result = player
                    .start()
                    .and_then(|()| player.tick(clock.now_millis()))
                    .map(|_| ());
                if let Err(e) = &result {
                    error!("could not start playback: {e}");
                }
                Some((reply, result))
            }
            Some(Command::Stop(reply)) => Some((reply, player.stop())),
            Some(Command::Shutdown) => break,
        };

        // flag first, then reply
        playing.store(player.is_playing(), Ordering::Release);
        if let Some((reply, result)) = replied {
            let _ = reply.send(result);
        }
    }

    if let Err(e) = player.stop() {
        error!("failed to silence output on shutdown: {e}");
    }
    playing.store(false, Ordering::Release);
}

impl PlayerHandle {
    /// Load a song. Parse errors come back from the playback thread.
    pub fn load(&self, song: &'static str, volume: u8) -> Result<()> {
        self.request(|reply| Command::Load {
            song,
            volume,
            reply,
        })
    }

    pub fn start(&self) -> Result<()> {
        self.request(Command::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.request(Command::Stop)
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub fn is_done(&self) -> bool {
        !self.is_playing()
    }

    /// The error that ended the last playback early, if any. Cleared by
    /// taking it or by the next `start()`.
    pub fn take_error(&self) -> Option<RtttlError> {
        self.failure.lock().ok().and_then(|mut slot| slot.take())
    }

    fn request(&self, make: impl FnOnce(Reply) -> Command) -> Result<()> {
        let (reply, response) = mpsc::channel();
        self.tx
            .send(make(reply))
            .map_err(|_| RtttlError::Output(anyhow!("playback thread has exited")))?;
        response
            .recv()
            .map_err(|_| RtttlError::Output(anyhow!("playback thread has exited")))?
    }
}

impl Drop for PlayerHandle {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("playback thread panicked");
            }
        }
    }
}
