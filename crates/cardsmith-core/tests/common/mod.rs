#![allow(dead_code)]

use cardsmith_core::objects::{DesignObject, Geometry, ObjectKind};
use cardsmith_core::{EditorConfig, ManualClock, Side, SurfaceController};
use std::sync::Arc;

/// Config whose surface is exactly `width` x `height` pixels.
pub fn config_for(width: f64, height: f64) -> EditorConfig {
    let mut config = EditorConfig::default();
    config.surface.width_mm = width / config.surface.px_per_mm;
    config.surface.height_mm = height / config.surface.px_per_mm;
    config
}

pub fn controller(width: f64, height: f64) -> (SurfaceController, ManualClock) {
    let _ = env_logger::builder().is_test(true).try_init();
    let clock = ManualClock::new();
    let ctl = SurfaceController::new(Side::Front, config_for(width, height), Arc::new(clock.clone()))
        .expect("controller");
    (ctl, clock)
}

pub fn rect(left: f64, top: f64, width: f64, height: f64) -> DesignObject {
    DesignObject::new(
        ObjectKind::Rectangle { corner_radius: 0.0 },
        Geometry::new(left, top, width, height),
    )
}

pub fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
