use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3, Vector4};
use instant::Duration;
use showroom::{
    camera::OrbitControls,
    config::{ControlsConfig, SceneConfig},
    flow::{FrameDriver, Viewport},
};

const FRAME: Duration = Duration::from_millis(16);

fn driver() -> FrameDriver {
    FrameDriver::new(&SceneConfig::default(), 800, 600)
}

fn undamped() -> FrameDriver {
    let config = SceneConfig {
        controls: ControlsConfig {
            enable_damping: false,
            ..ControlsConfig::default()
        },
        ..SceneConfig::default()
    };
    FrameDriver::new(&config, 800, 600)
}

/// Azimuth of the camera around the y axis, 0 on the +z axis.
fn azimuth(driver: &FrameDriver) -> f32 {
    let offset = driver.camera.position - driver.controls.target;
    offset.x.atan2(offset.z)
}

#[test]
fn should_update_aspect_on_resize() {
    let mut driver = driver();
    assert!((driver.camera.aspect - 800.0 / 600.0).abs() < 1e-6);

    assert!(driver.resize(1200, 800));

    assert_eq!(driver.viewport(), Viewport { width: 1200, height: 800 });
    assert_eq!(driver.camera.aspect, 1.5);
}

#[test]
fn should_ignore_zero_sized_viewports() {
    let mut driver = driver();

    assert!(!driver.resize(0, 600));
    assert!(!driver.resize(800, 0));

    assert_eq!(driver.viewport(), Viewport { width: 800, height: 600 });
    assert!((driver.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
}

#[test]
fn should_stay_put_without_input() {
    let mut driver = driver();
    let before = driver.camera.position;

    assert!(!driver.advance(FRAME));

    assert!((driver.camera.position - before).magnitude() < 1e-4);
}

#[test]
fn should_ease_towards_the_input_when_damped() {
    let mut driver = driver();
    driver.controls.rotate_left(0.4);

    assert!(driver.advance(FRAME));
    let first = azimuth(&driver);
    driver.advance(FRAME);
    let second = azimuth(&driver);

    // a quarter of the pending motion per frame, the rest decays
    assert!((first + 0.1).abs() < 1e-4, "{first}");
    assert!((second - first + 0.075).abs() < 1e-4, "{second}");
    for _ in 0..200 {
        driver.advance(FRAME);
    }
    assert!((azimuth(&driver) + 0.4).abs() < 1e-3);
}

#[test]
fn should_apply_input_at_once_without_damping() {
    let mut driver = undamped();
    driver.controls.rotate_left(0.4);

    assert!(driver.advance(FRAME));
    assert!((azimuth(&driver) + 0.4).abs() < 1e-4);
    assert!(!driver.advance(FRAME));
}

#[test]
fn should_keep_the_orbit_radius_while_rotating() {
    let mut driver = undamped();
    driver.controls.rotate_left(1.3);
    driver.controls.rotate_up(0.5);

    driver.advance(FRAME);

    assert!((driver.controls.distance(&driver.camera) - 5.0).abs() < 1e-4);
}

#[test]
fn should_not_orbit_below_the_ground() {
    let mut driver = undamped();

    driver.controls.rotate_up(-2.0);
    driver.advance(FRAME);

    assert!(driver.camera.position.y > -1e-4, "{:?}", driver.camera.position);

    driver.controls.rotate_up(1.0);
    driver.advance(FRAME);
    let polar = (driver.camera.position.y / 5.0).acos();
    assert!((polar - (PI / 2.0 - 1.0)).abs() < 1e-3);
}

#[test]
fn should_dolly_within_the_distance_limits() {
    let config = SceneConfig {
        controls: ControlsConfig {
            enable_damping: false,
            min_distance: 2.0,
            max_distance: 8.0,
            ..ControlsConfig::default()
        },
        ..SceneConfig::default()
    };
    let mut driver = FrameDriver::new(&config, 800, 600);

    driver.controls.dolly_in(2.0);
    driver.advance(FRAME);
    assert!((driver.controls.distance(&driver.camera) - 2.5).abs() < 1e-4);

    driver.controls.dolly_in(4.0);
    driver.advance(FRAME);
    assert!((driver.controls.distance(&driver.camera) - 2.0).abs() < 1e-4);

    driver.controls.dolly_out(100.0);
    driver.advance(FRAME);
    assert!((driver.controls.distance(&driver.camera) - 8.0).abs() < 1e-4);
}

#[test]
fn should_pan_along_the_ground_plane() {
    let mut driver = undamped();
    let camera = driver.camera.clone();

    driver.controls.pan(&camera, 0.0, 100.0);
    driver.advance(FRAME);

    // looking along -z, moving "up" on the ground plane moves the target forward
    assert!(driver.controls.target.z < 0.0);
    assert!(driver.controls.target.y.abs() < 1e-5);
    assert_eq!(driver.camera.target, driver.controls.target);
}

#[test]
fn should_pan_in_screen_space_when_enabled() {
    let mut controls = OrbitControls::new(
        ControlsConfig {
            enable_damping: false,
            screen_space_panning: true,
            ..ControlsConfig::default()
        },
        Point3::new(0.0, 0.0, 0.0),
    );
    let mut camera = driver().camera;
    controls.set_viewport_height(600);

    controls.pan(&camera.clone(), 0.0, 100.0);
    controls.update(&mut camera);

    assert!(controls.target.y > 0.0);
    assert!(controls.target.z.abs() < 1e-5);
}

#[test]
fn should_project_the_target_to_the_centre_of_the_screen() {
    let driver = driver();

    let clip = driver.camera.view_proj() * Vector4::new(0.0, 0.0, 0.0, 1.0);

    assert!((clip.x / clip.w).abs() < 1e-5);
    assert!((clip.y / clip.w).abs() < 1e-5);
    let depth = clip.z / clip.w;
    assert!((0.0..=1.0).contains(&depth), "{depth}");
}
