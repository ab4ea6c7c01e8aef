use bevy::{app::AppExit, log::LogPlugin, prelude::*};
use checkers_engine::{Game, Phase};

/// Runs a bot-vs-bot game without a window, one turn per frame, and exits
/// once the game is decided.
pub struct HeadlessPlugin {
    pub game: Game,
}

#[derive(Resource)]
struct HeadlessGame(Game);

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((MinimalPlugins, LogPlugin::default()))
            .insert_resource(HeadlessGame(self.game.clone()))
            .add_systems(Update, play_turn);
    }
}

fn play_turn(mut game: ResMut<HeadlessGame>, mut exit: EventWriter<AppExit>) {
    let game = &mut game.0;
    match game.phase() {
        Phase::ApplyingBotMove => {
            if let Err(err) = game.play_bot_turn() {
                error!("bot turn failed: {}", err);
                exit.send(AppExit);
            }
        }
        Phase::GameOver(result) => {
            info!(
                "{} after {} turns\n{}",
                result,
                game.turn_number(),
                game.grid()
            );
            exit.send(AppExit);
        }
        Phase::AwaitingHumanInput => {
            error!("{:?} is human; headless games need bots on both sides", game.side_to_move());
            exit.send(AppExit);
        }
        Phase::Quit => exit.send(AppExit),
    }
}
