use rand::Rng;
use web_time::Instant;

use crate::config::MeterConfig;
use crate::meter::{BarLevel, Meter};
use crate::scheduler::{FrameHandle, FrameScheduler};

/// Drives the [`Meter`] from a chain of one-shot frame requests.
///
/// At most one request is outstanding at any time; `stop` cancels it and puts
/// the bars back at rest.
pub struct Animator {
    meter: Meter,
    pending: Option<FrameHandle>,
}

impl Animator {
    pub fn new(config: &MeterConfig) -> Self {
        Self {
            meter: Meter::new(config),
            pending: None,
        }
    }

    pub fn meter(&self) -> &Meter {
        &self.meter
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.pending.is_none() {
            self.pending = scheduler.request_frame();
        }
    }

    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> &[BarLevel] {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        self.meter.reset()
    }

    /// Runs the frame callback. Returns the levels to draw, or `None` when the
    /// frame was dropped because the animator is no longer active.
    pub fn frame<S, R>(
        &mut self,
        active: bool,
        now: Instant,
        scheduler: &mut S,
        rng: &mut R,
    ) -> Option<&[BarLevel]>
    where
        S: FrameScheduler + ?Sized,
        R: Rng + ?Sized,
    {
        if self.pending.take().is_none() {
            return None;
        }
        if !active {
            self.meter.reset();
            return None;
        }
        // a refused request leaves `pending` empty so the next `start` retries
        self.pending = scheduler.request_frame();
        Some(self.meter.step(now, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn start_is_idempotent() {
        let mut sched = ManualScheduler::default();
        let mut anim = Animator::new(&MeterConfig::default());
        anim.start(&mut sched);
        anim.start(&mut sched);
        assert_eq!(sched.requested(), 1);
        assert!(anim.is_running());
    }

    #[test]
    fn each_frame_schedules_exactly_one_successor() {
        let mut sched = ManualScheduler::default();
        let mut rng = SmallRng::seed_from_u64(8);
        let mut anim = Animator::new(&MeterConfig::default());
        anim.start(&mut sched);
        for _ in 0..10 {
            assert!(sched.take_pending().is_some());
            assert!(anim.frame(true, Instant::now(), &mut sched, &mut rng).is_some());
            anim.start(&mut sched);
        }
        assert_eq!(sched.requested(), 11);
    }

    #[test]
    fn stop_cancels_and_rests_bars() {
        let mut sched = ManualScheduler::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let mut anim = Animator::new(&MeterConfig::default());
        anim.start(&mut sched);
        sched.take_pending();
        anim.frame(true, Instant::now(), &mut sched, &mut rng);

        let levels = anim.stop(&mut sched).to_vec();
        assert!(sched.pending().is_none());
        assert!(!anim.is_running());
        assert!(levels.iter().all(|l| l.height_px == 80.0 && l.opacity == 0.2));
    }

    #[test]
    fn inactive_frame_is_dropped_without_rescheduling() {
        let mut sched = ManualScheduler::default();
        let mut rng = SmallRng::seed_from_u64(10);
        let mut anim = Animator::new(&MeterConfig::default());
        anim.start(&mut sched);
        sched.take_pending();
        assert!(anim.frame(false, Instant::now(), &mut sched, &mut rng).is_none());
        assert!(sched.pending().is_none());
        assert!(!anim.is_running());
    }

    /// Refuses the first `refusals` requests, then behaves like [`ManualScheduler`].
    struct RefusingScheduler {
        refusals: usize,
        inner: ManualScheduler,
    }

    impl FrameScheduler for RefusingScheduler {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            if self.refusals > 0 {
                self.refusals -= 1;
                return None;
            }
            self.inner.request_frame()
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.inner.cancel_frame(handle);
        }
    }

    #[test]
    fn refused_request_does_not_wedge_start() {
        let mut sched = RefusingScheduler {
            refusals: 1,
            inner: ManualScheduler::default(),
        };
        let mut anim = Animator::new(&MeterConfig::default());
        anim.start(&mut sched);
        assert!(!anim.is_running());

        anim.start(&mut sched);
        assert!(anim.is_running());
        assert!(sched.inner.pending().is_some());
    }

    #[test]
    fn refused_reschedule_lets_the_chain_restart() {
        let mut sched = RefusingScheduler {
            refusals: 0,
            inner: ManualScheduler::default(),
        };
        let mut rng = SmallRng::seed_from_u64(14);
        let mut anim = Animator::new(&MeterConfig::default());
        anim.start(&mut sched);
        sched.inner.take_pending();

        sched.refusals = 1;
        assert!(anim.frame(true, Instant::now(), &mut sched, &mut rng).is_some());
        assert!(!anim.is_running());

        anim.start(&mut sched);
        assert!(anim.is_running());
        assert_eq!(sched.inner.requested(), 2);
    }

    #[test]
    fn late_frame_still_continues_the_chain() {
        let mut sched = ManualScheduler::default();
        let mut rng = SmallRng::seed_from_u64(15);
        let mut anim = Animator::new(&MeterConfig::default());
        anim.start(&mut sched);
        // the host fired the request but delivered the callback later
        sched.take_pending();
        let later = Instant::now() + std::time::Duration::from_millis(40);
        assert!(anim.frame(true, later, &mut sched, &mut rng).is_some());
        assert!(sched.pending().is_some());
        assert!(anim.is_running());
    }

    #[test]
    fn stray_frame_after_stop_is_ignored() {
        let mut sched = ManualScheduler::default();
        let mut rng = SmallRng::seed_from_u64(12);
        let mut anim = Animator::new(&MeterConfig::default());
        anim.start(&mut sched);
        anim.stop(&mut sched);
        assert!(anim.frame(true, Instant::now(), &mut sched, &mut rng).is_none());
        assert_eq!(sched.requested(), 1);
    }
}
