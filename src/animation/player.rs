//! Playback scheduler cycling decoded frames into display buffers.

use std::collections::HashMap;
use std::io::Cursor;

use super::decoder::{DecodedAnimation, decode_bytes};
use super::{AnimationError, format};
use crate::display::{DisplayBuffers, DisplayError, DisplayHandle, PixelFormat, TextureDesc};

/// Identifies the external entity a playback is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(pub u64);

/// Stable index of a playback slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Playback state of one animation placement.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    used: bool,
    owner: OwnerId,
    animation: Option<DecodedAnimation>,
    display: Option<DisplayHandle>,
    current_frame: usize,
    /// Seconds until the next frame advance.
    time_remaining: f32,
}

impl PlaybackState {
    /// Start playback at frame 0, holding it for frame 0's delay.
    pub fn new(owner: OwnerId, animation: DecodedAnimation, display: Option<DisplayHandle>) -> Self {
        let time_remaining = animation.delay_secs(0);
        Self {
            used: true,
            owner,
            animation: Some(animation),
            display,
            current_frame: 0,
            time_remaining,
        }
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn animation(&self) -> Option<&DecodedAnimation> {
        self.animation.as_ref()
    }

    pub fn display_handle(&self) -> Option<DisplayHandle> {
        self.display
    }

    pub fn current_frame_index(&self) -> usize {
        self.current_frame
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    /// Pixels of the active frame, or `None` for a released slot.
    pub fn current_frame(&self) -> Option<&[u8]> {
        self.animation
            .as_ref()
            .filter(|_| self.used)
            .map(|animation| animation.pixels(self.current_frame))
    }

    /// Advance playback by `dt` seconds, returning the number of frame
    /// advances.
    ///
    /// Each advance holds the new frame for its own delay, so at most one
    /// frame with a non-zero delay is reached per tick. Zero-delay frames are
    /// passed through within the same tick, capped at `frame_count` advances.
    pub fn tick(&mut self, dt: f32) -> usize {
        if !self.used || !dt.is_finite() {
            return 0;
        }
        let Some(animation) = &self.animation else {
            return 0;
        };
        let frame_count = animation.frame_count();

        self.time_remaining -= dt;
        if self.time_remaining > 0.0 {
            return 0;
        }

        let mut advances = 0;
        loop {
            self.current_frame = (self.current_frame + 1) % frame_count;
            self.time_remaining = animation.delay_secs(self.current_frame);
            advances += 1;
            if self.time_remaining > 0.0 || advances == frame_count {
                break;
            }
        }
        advances
    }

    /// Mark the slot unused and drop its frames, handing back the display
    /// handle for destruction.
    fn release(&mut self) -> Option<DisplayHandle> {
        self.used = false;
        self.animation = None;
        self.current_frame = 0;
        self.time_remaining = 0.0;
        self.display.take()
    }
}

/// Error type for attaching animations.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Animation(#[from] AnimationError),

    #[error("Failed to create display buffer: {0}")]
    Display(#[from] DisplayError),
}

/// Arena of playback slots.
///
/// Released slots stay in place and are recycled by the next attach, so
/// slot ids of live placements never move.
///
/// Usage:
/// ```ignore
/// let mut playback = PlaybackManager::new();
/// playback.attach(OwnerId(7), decode_file("spinner.gif")?, "albedo", &mut display)?;
/// loop {
///     playback.tick(dt, &mut display);
/// }
/// ```
#[derive(Debug, Default)]
pub struct PlaybackManager {
    slots: Vec<PlaybackState>,
    owners: HashMap<OwnerId, SlotId>,
    free: Vec<SlotId>,
}

impl PlaybackManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a decoded animation to `owner`, creating a display buffer
    /// initialised with frame 0.
    ///
    /// An owner that already has a playback is released first.
    pub fn attach<D: DisplayBuffers + ?Sized>(
        &mut self,
        owner: OwnerId,
        animation: DecodedAnimation,
        label: &str,
        display: &mut D,
    ) -> Result<SlotId, PlaybackError> {
        if self.detach(owner, display) {
            log::debug!("Replaced existing playback for owner {}", owner.0);
        }

        let desc = TextureDesc {
            width: animation.width(),
            height: animation.height(),
            format: PixelFormat::Rgba8,
            label: label.to_owned(),
        };
        let handle = display.create(&desc, animation.pixels(0))?;

        let frame_count = animation.frame_count();
        let state = PlaybackState::new(owner, animation, Some(handle));
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = state;
                id
            }
            None => {
                self.slots.push(state);
                SlotId(self.slots.len() - 1)
            }
        };
        self.owners.insert(owner, id);

        log::info!(
            "Attached {}x{} animation ({} frames) to owner {} in slot {}",
            desc.width,
            desc.height,
            frame_count,
            owner.0,
            id.0
        );
        Ok(id)
    }

    /// Decode a compiled resource and attach it to `owner`.
    pub fn attach_resource<D: DisplayBuffers + ?Sized>(
        &mut self,
        owner: OwnerId,
        resource: &[u8],
        label: &str,
        display: &mut D,
    ) -> Result<SlotId, PlaybackError> {
        let source = format::read_resource(&mut Cursor::new(resource)).map_err(AnimationError::Io)?;
        let animation = decode_bytes(&source)?;
        self.attach(owner, animation, label, display)
    }

    /// Release the playback attached to `owner`. Returns false if there was
    /// none.
    pub fn detach<D: DisplayBuffers + ?Sized>(&mut self, owner: OwnerId, display: &mut D) -> bool {
        let Some(id) = self.owners.remove(&owner) else {
            return false;
        };
        if let Some(handle) = self.slots[id.0].release() {
            display.destroy(handle);
        }
        self.free.push(id);
        true
    }

    /// Advance every active playback by `dt` seconds, publishing the new
    /// frame of each playback that advanced. Returns the number of buffers
    /// updated.
    pub fn tick<D: DisplayBuffers + ?Sized>(&mut self, dt: f32, display: &mut D) -> usize {
        log::trace!("Tick of {}s over {} playback(s)", dt, self.owners.len());

        let mut published = 0;
        for state in self.slots.iter_mut().filter(|s| s.used) {
            if state.tick(dt) == 0 {
                continue;
            }
            if let (Some(handle), Some(pixels)) = (state.display, state.current_frame()) {
                log::debug!(
                    "Owner {} advanced to frame {}",
                    state.owner.0,
                    state.current_frame
                );
                display.update(handle, pixels);
                published += 1;
            }
        }
        published
    }

    /// Release every active playback.
    pub fn shutdown<D: DisplayBuffers + ?Sized>(&mut self, display: &mut D) {
        let owners: Vec<OwnerId> = self.owners.keys().copied().collect();
        for owner in owners {
            self.detach(owner, display);
        }
    }

    /// Playback attached to `owner`.
    pub fn get(&self, owner: OwnerId) -> Option<&PlaybackState> {
        self.owners.get(&owner).map(|id| &self.slots[id.0])
    }

    pub fn slot_id(&self, owner: OwnerId) -> Option<SlotId> {
        self.owners.get(&owner).copied()
    }

    pub fn slot(&self, id: SlotId) -> Option<&PlaybackState> {
        self.slots.get(id.0)
    }

    /// Number of live playbacks.
    pub fn active_count(&self) -> usize {
        self.owners.len()
    }

    /// Number of slots, live or recyclable.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over live playbacks.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &PlaybackState)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.used)
            .map(|(i, s)| (SlotId(i), s))
    }
}
