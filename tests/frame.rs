use glam::{Vec2, Vec4};
use halo_wasm::frame::SurfaceSync;
use halo_wasm::shade::{haze_fragment, HAZE_BASE_RADIUS, HAZE_RADIUS_GAIN};
use halo_wasm::viewport::DeviceSize;
use halo_wasm::{Session, Settings};

fn run_frames(session: &mut Session, frames: usize) {
    for _ in 0..frames {
        let passes = session.begin_frame();
        assert_eq!(passes.len(), 2);
        session.end_frame();
    }
}

#[test]
fn centred_pointer_grows_the_haze() {
    let mut session = Session::new(&Settings::default(), 800.0, 600.0, 1.0);
    session.pointer_moved(400.0, 300.0);
    assert_eq!(session.intensity().target, 1.0);

    run_frames(&mut session, 200);

    let sample = haze_fragment(Vec2::new(400.5, 300.5), session.haze(), Vec4::ZERO);
    assert!((sample.radius - 0.73).abs() < 1e-5, "radius={}", sample.radius);
    assert!((sample.radius - (HAZE_BASE_RADIUS + HAZE_RADIUS_GAIN)).abs() < 1e-5);
    assert!(sample.alpha > 1.0);
}

#[test]
fn corner_pointer_fades_the_haze_out() {
    let mut session = Session::new(&Settings::default(), 1024.0, 768.0, 2.0);
    session.pointer_moved(512.0, 384.0);
    run_frames(&mut session, 60);
    assert!(session.haze().intensity > 0.9);

    session.pointer_moved(0.0, 0.0);
    assert_eq!(session.intensity().target, 0.0);
    run_frames(&mut session, 300);

    let previous = Vec4::new(0.3, 0.25, 0.0, 1.0);
    let res = session.haze().resolution;
    for frag in [res * 0.5, Vec2::new(0.5, 0.5), res - 0.5] {
        let sample = haze_fragment(frag, session.haze(), previous);
        assert!(sample.alpha.abs() < 1e-6, "alpha={}", sample.alpha);
        assert!((sample.color - previous).abs().max_element() < 1e-6);
    }
}

#[test]
fn resize_keeps_surfaces_and_uniforms_in_step() {
    let mut session = Session::new(&Settings::default(), 800.0, 600.0, 1.0);
    let mut sync = SurfaceSync::default();
    sync.reconcile(session.viewport().device_size());

    for (w, h, ratio) in [(1024.0, 768.0, 1.5), (333.0, 777.0, 3.0), (0.0, -5.0, 1.0)] {
        session.resize(w, h, ratio);
        let size = session.viewport().device_size();
        let provisioned = sync.reconcile(size).or(sync.provisioned());
        assert_eq!(provisioned, Some(size));
        assert_eq!(session.ring().resolution, size.as_vec2());
        assert_eq!(session.haze().resolution, size.as_vec2());
        assert_eq!(session.ring().aspect_ratio, session.haze().aspect_ratio);
    }

    assert_eq!(
        session.viewport().device_size(),
        DeviceSize {
            width: 1,
            height: 1
        }
    );
}

#[test]
fn first_resize_example_matches_pixel_ratio() {
    let mut session = Session::new(&Settings::default(), 800.0, 600.0, 1.0);
    session.resize(1024.0, 768.0, 1.5);
    assert_eq!(
        session.viewport().device_size(),
        DeviceSize {
            width: 1536,
            height: 1152
        }
    );
    // 333x777 at a capped ratio of 2
    session.resize(333.0, 777.0, 3.0);
    assert_eq!(session.ring().resolution, Vec2::new(666.0, 1554.0));
}
