//! Sink trait for rendering collaborators.
//!
//! The engine itself never draws. Hosts either read the `FrameBuffer`
//! returned by `ParticleEngine::tick`, or implement this trait and let
//! `tick_with` push each frame to them.

use super::frame::FrameBuffer;

/// A consumer of per-tick particle snapshots.
pub trait ParticleSink {
    /// Receive one tick's snapshot. `frame.removals` lists the ids the
    /// sink should retire before drawing `frame.instances`.
    fn submit(&mut self, frame: &FrameBuffer);

    /// The simulation viewport changed size.
    fn resize(&mut self, _width: f32, _height: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::frame::ParticleInstance;

    struct Counting {
        frames: usize,
        instances: usize,
    }

    impl ParticleSink for Counting {
        fn submit(&mut self, frame: &FrameBuffer) {
            self.frames += 1;
            self.instances += frame.instances.len();
        }
    }

    #[test]
    fn sink_receives_frames() {
        let mut sink = Counting {
            frames: 0,
            instances: 0,
        };
        let mut frame = FrameBuffer::new();
        frame.push(ParticleInstance::default());
        sink.submit(&frame);
        sink.submit(&frame);
        assert_eq!(sink.frames, 2);
        assert_eq!(sink.instances, 2);
    }
}
