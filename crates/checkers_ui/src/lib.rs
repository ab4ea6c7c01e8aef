use bevy::{
    app::AppExit,
    prelude::*,
    sprite::{MaterialMesh2dBundle, Mesh2dHandle},
    tasks::{AsyncComputeTaskPool, Task},
    window::{PresentMode, WindowResolution},
};
use checkers_core::{Color as PieceColor, Grid, Position, Rank};
use checkers_engine::{BotTurn, Control, Game, InputEvent, Phase};

mod headless;

pub use headless::HeadlessPlugin;

const SQUARE_SIZE: f32 = 80.0;
const PIECE_RADIUS: f32 = SQUARE_SIZE * 0.38;
const CROWN_RADIUS: f32 = SQUARE_SIZE * 0.16;

/// Windowed game: draws the board, turns clicks and keys into game input and
/// runs bot searches off the main thread.
pub struct CheckersUiPlugin {
    pub game: Game,
}

#[derive(Resource)]
struct GameSession {
    game: Game,
    bot_task: Option<Task<BotTurn>>,
    pending: Option<PendingTurn>,
}

impl GameSession {
    fn cancel_bot(&mut self) {
        self.bot_task = None;
        self.pending = None;
    }

    // What the board should show right now: the live grid, or the step of a
    // bot turn currently on display.
    fn displayed_grid(&self) -> Grid {
        match &self.pending {
            Some(pending) if pending.shown > 0 => pending.frames[pending.shown - 1],
            _ => self.game.grid(),
        }
    }
}

// A finished bot search whose steps are being shown one at a time before
// the turn is applied to the game.
struct PendingTurn {
    turn: BotTurn,
    frames: Vec<Grid>,
    shown: usize,
    timer: Timer,
}

#[derive(Resource)]
struct PieceAssets {
    piece_mesh: Mesh2dHandle,
    crown_mesh: Mesh2dHandle,
    white: Handle<ColorMaterial>,
    black: Handle<ColorMaterial>,
    crown: Handle<ColorMaterial>,
}

#[derive(Component)]
struct Square;

#[derive(Component)]
struct PieceSprite;

#[derive(Component)]
struct HighlightSprite;

#[derive(Component)]
struct StatusText;

// Everything drawn on screen; the board is redrawn only when this changes
#[derive(Clone, PartialEq)]
struct View {
    grid: Grid,
    highlighted: Vec<Position>,
    active: Option<Position>,
    status: String,
}

impl Plugin for CheckersUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Checkers".into(),
                resolution: WindowResolution::new(800.0, 800.0),
                present_mode: PresentMode::AutoVsync,
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(GameSession {
            game: self.game.clone(),
            bot_task: None,
            pending: None,
        })
        .add_systems(Startup, setup)
        .add_systems(Update, (handle_input, drive_bots, draw_board).chain());
    }
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.insert_resource(PieceAssets {
        piece_mesh: meshes.add(shape::Circle::new(PIECE_RADIUS).into()).into(),
        crown_mesh: meshes.add(shape::Circle::new(CROWN_RADIUS).into()).into(),
        white: materials.add(ColorMaterial::from(Color::rgb(0.93, 0.9, 0.82))),
        black: materials.add(ColorMaterial::from(Color::rgb(0.55, 0.1, 0.1))),
        crown: materials.add(ColorMaterial::from(Color::rgb(0.95, 0.75, 0.2))),
    });

    commands.spawn(Camera2dBundle::default());

    // Frame
    commands.spawn(SpriteBundle {
        sprite: Sprite {
            color: Color::rgb(0.1, 0.1, 0.1),
            custom_size: Some(Vec2::splat(8.0 * SQUARE_SIZE + 20.0)),
            ..default()
        },
        ..default()
    });

    for position in Position::all() {
        commands.spawn((
            SpriteBundle {
                sprite: Sprite {
                    color: if position.is_dark() {
                        Color::rgb(0.3, 0.3, 0.3)
                    } else {
                        Color::rgb(0.9, 0.9, 0.9)
                    },
                    custom_size: Some(Vec2::splat(SQUARE_SIZE)),
                    ..default()
                },
                transform: Transform::from_translation(cell_to_world(position, 1.0)),
                ..default()
            },
            Square,
        ));
    }

    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: 28.0,
                color: Color::WHITE,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        }),
        StatusText,
    ));
}

fn handle_input(
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    mouse_button: Res<Input<MouseButton>>,
    keys: Res<Input<KeyCode>>,
    mut session: ResMut<GameSession>,
    mut exit: EventWriter<AppExit>,
) {
    let mut events = Vec::new();
    if keys.just_pressed(KeyCode::Escape) {
        events.push(InputEvent::Control(Control::Quit));
    }
    if keys.just_pressed(KeyCode::N) {
        events.push(InputEvent::Control(Control::Replay));
    }
    if keys.just_pressed(KeyCode::Back) {
        events.push(InputEvent::Control(Control::Rollback));
    }

    if mouse_button.just_pressed(MouseButton::Left) {
        let window = windows.single();
        let (camera, camera_transform) = camera_q.single();
        if let Some(cell) = window
            .cursor_position()
            .and_then(|cursor| camera.viewport_to_world(camera_transform, cursor))
            .and_then(|ray| world_to_cell(ray.origin.truncate()))
        {
            events.push(InputEvent::CellSelected(cell));
        }
    }

    for event in events {
        if matches!(
            event,
            InputEvent::Control(Control::Replay | Control::Quit)
        ) {
            session.cancel_bot();
        }
        if let Err(err) = session.game.handle_input(event) {
            warn!("input {:?} failed: {}", event, err);
        }
    }

    if session.game.phase() == Phase::Quit {
        exit.send(AppExit);
    }
}

fn drive_bots(time: Res<Time>, mut session: ResMut<GameSession>) {
    let session = &mut *session;

    if let Some(pending) = session.pending.as_mut() {
        if !pending.timer.tick(time.delta()).just_finished() {
            return;
        }
        if pending.shown < pending.frames.len() {
            pending.shown += 1;
            pending.timer.reset();
            return;
        }
        if let Some(pending) = session.pending.take() {
            if let Err(err) = session.game.apply_bot_turn(pending.turn) {
                warn!("bot turn dropped: {}", err);
            }
        }
        return;
    }

    if let Some(mut task) = session.bot_task.take() {
        match futures_lite::future::block_on(futures_lite::future::poll_once(&mut task)) {
            Some(turn) => {
                let frames = turn_frames(session.game.grid(), &turn);
                session.pending = Some(PendingTurn {
                    turn,
                    frames,
                    shown: 0,
                    timer: Timer::new(session.game.config().bot_delay, TimerMode::Once),
                });
            }
            None => session.bot_task = Some(task),
        }
        return;
    }

    if session.game.is_bot_turn() {
        match session.game.bot_job() {
            Ok(job) => {
                let thread_pool = AsyncComputeTaskPool::get();
                session.bot_task = Some(thread_pool.spawn(async move { job.run() }));
            }
            Err(err) => warn!("could not start bot search: {}", err),
        }
    }
}

fn draw_board(
    mut commands: Commands,
    session: Res<GameSession>,
    assets: Res<PieceAssets>,
    pieces: Query<Entity, With<PieceSprite>>,
    highlights: Query<Entity, With<HighlightSprite>>,
    mut status: Query<&mut Text, With<StatusText>>,
    mut last_view: Local<Option<View>>,
) {
    let game = &session.game;
    let view = View {
        grid: session.displayed_grid(),
        highlighted: game.highlighted_cells(),
        active: game.active_cell(),
        status: status_line(game, session.bot_task.is_some() || session.pending.is_some()),
    };
    if last_view.as_ref() == Some(&view) {
        return;
    }

    for entity in pieces.iter().chain(highlights.iter()) {
        commands.entity(entity).despawn_recursive();
    }

    for &cell in &view.highlighted {
        spawn_highlight(&mut commands, cell, Color::rgba(0.2, 0.8, 0.3, 0.45));
    }
    if let Some(active) = view.active {
        spawn_highlight(&mut commands, active, Color::rgba(0.95, 0.85, 0.2, 0.55));
    }

    for (cell, piece) in view.grid.pieces() {
        let material = match piece.color {
            PieceColor::White => assets.white.clone(),
            PieceColor::Black => assets.black.clone(),
        };
        commands
            .spawn((
                MaterialMesh2dBundle {
                    mesh: assets.piece_mesh.clone(),
                    material,
                    transform: Transform::from_translation(cell_to_world(cell, 2.0)),
                    ..default()
                },
                PieceSprite,
            ))
            .with_children(|parent| {
                if piece.is_king() {
                    parent.spawn(MaterialMesh2dBundle {
                        mesh: assets.crown_mesh.clone(),
                        material: assets.crown.clone(),
                        transform: Transform::from_xyz(0.0, 0.0, 0.1),
                        ..default()
                    });
                }
            });
    }

    if let Ok(mut text) = status.get_single_mut() {
        text.sections[0].value = view.status.clone();
    }
    *last_view = Some(view);
}

fn spawn_highlight(commands: &mut Commands, cell: Position, color: Color) {
    commands.spawn((
        SpriteBundle {
            sprite: Sprite {
                color,
                custom_size: Some(Vec2::splat(SQUARE_SIZE)),
                ..default()
            },
            transform: Transform::from_translation(cell_to_world(cell, 1.5)),
            ..default()
        },
        HighlightSprite,
    ));
}

fn turn_frames(start: Grid, turn: &BotTurn) -> Vec<Grid> {
    let mut grid = start;
    turn.moves
        .iter()
        .map(|mv| {
            grid.play(mv);
            grid
        })
        .collect()
}

fn status_line(game: &Game, bot_busy: bool) -> String {
    let side = game.side_to_move();
    let state = match game.phase() {
        Phase::GameOver(result) => format!("{result}. Press N for a new game"),
        Phase::Quit => "Bye".to_string(),
        Phase::ApplyingBotMove if bot_busy => format!("{side:?} is thinking..."),
        Phase::ApplyingBotMove => format!("Turn {}: {side:?} (bot)", game.turn_number() + 1),
        Phase::AwaitingHumanInput if game.in_capture_chain() => {
            format!("{side:?} must keep capturing")
        }
        Phase::AwaitingHumanInput => format!("Turn {}: {side:?} to move", game.turn_number() + 1),
    };

    let grid = game.grid();
    let material = |color| grid.count(color, Rank::Man) + grid.count(color, Rank::King);
    format!(
        "{state}   White {} | Black {}",
        material(PieceColor::White),
        material(PieceColor::Black)
    )
}

/// Centre of `cell` in world space; row 0 is drawn at the top.
fn cell_to_world(cell: Position, z: f32) -> Vec3 {
    Vec3::new(
        (cell.col() as f32 - 3.5) * SQUARE_SIZE,
        (3.5 - cell.row() as f32) * SQUARE_SIZE,
        z,
    )
}

fn world_to_cell(world: Vec2) -> Option<Position> {
    let col = (world.x / SQUARE_SIZE + 4.0).floor();
    let row = (4.0 - world.y / SQUARE_SIZE).floor();
    if !(0.0..8.0).contains(&col) || !(0.0..8.0).contains(&row) {
        return None;
    }
    Position::new(row as u8, col as u8)
}
