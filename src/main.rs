use avian2d::prelude::*;
use bevy::prelude::*;

use platform_player::PlatformPlayerPlugin;
use platform_player::movement::SelectedProfile;

/// Fixed step rate the controller and physics run at.
const FIXED_HZ: f64 = 64.0;

fn main() {
    // Optional first argument picks a profile from player.ron
    let profile_id = std::env::args().nth(1);

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Platform Player".to_string(),
            resolution: (1280, 720).into(),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .add_plugins(PhysicsPlugins::default())
    .insert_resource(Gravity(Vec2::NEG_Y * 980.0))
    .insert_resource(Time::<Fixed>::from_hz(FIXED_HZ))
    .insert_resource(SelectedProfile { profile_id })
    .add_plugins(PlatformPlayerPlugin)
    .add_systems(Startup, spawn_camera);

    #[cfg(feature = "dev-tools")]
    app.add_plugins((
        platform_player::movement::dev::TestRoomPlugin,
        platform_player::debug::DebugPlugin,
    ));

    app.run();
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
