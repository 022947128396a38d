//! Text and JSON renderings of the game state.

use crate::command::Lifecycle;
use crate::game::Game;
use crate::player::Player;
use crate::server::Server;
use shared::{GameSnapshot, PlayerId, PlayerView, ServerView};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Full view of `server` for its owner
fn own_server_view(server: &Server, viewer: PlayerId) -> ServerView {
    ServerView {
        address: server.address,
        command: server.current_command.as_ref().map(|c| c.to_string()),
        cycles_left: server.current_command.as_ref().map(|c| c.duration()),
        pre_result: server.pre_result.clone(),
        post_result: server.post_result.clone(),
        weaknesses: weaknesses_seen(server, viewer),
    }
}

/// What a non-owner knows: the address and the weaknesses they found
fn known_server_view(server: &Server, viewer: PlayerId) -> ServerView {
    ServerView {
        address: server.address,
        command: None,
        cycles_left: None,
        pre_result: None,
        post_result: None,
        weaknesses: weaknesses_seen(server, viewer),
    }
}

fn weaknesses_seen(server: &Server, viewer: PlayerId) -> Vec<String> {
    server
        .found_weaknesses(viewer)
        .map(|w| w.description.clone())
        .collect()
}

fn player_view(game: &Game, player: &Player) -> PlayerView {
    let viewer = player.index.unwrap_or(PlayerId(usize::MAX));
    PlayerView {
        handle: player.handle.clone(),
        index: player.index,
        credits: player.credits,
        servers: player
            .servers
            .iter()
            .map(|s| own_server_view(s, viewer))
            .collect(),
        known_servers: player
            .known_servers
            .iter()
            .filter_map(|at| game.server(*at))
            .map(|s| known_server_view(s, viewer))
            .collect(),
    }
}

pub fn snapshot(game: &Game) -> GameSnapshot {
    GameSnapshot {
        game_id: game.id().to_string(),
        tick: game.tick(),
        players: game.players().iter().map(|p| player_view(game, p)).collect(),
    }
}

fn write_server(f: &mut fmt::Formatter<'_>, server: &ServerView, indent: &str) -> fmt::Result {
    writeln!(f, "{}Server: {}", indent, server.address)?;
    if let (Some(command), Some(left)) = (&server.command, server.cycles_left) {
        writeln!(f, "{}    {}, {} cycle(s) left", indent, command, left)?;
    }
    for line in [&server.pre_result, &server.post_result].into_iter().flatten() {
        writeln!(f, "{}    > {}", indent, line)?;
    }
    for weakness in &server.weaknesses {
        writeln!(f, "{}    '{}' weakness", indent, weakness)?;
    }
    Ok(())
}

/// Plain text dump of a snapshot, one block per player
pub struct TextReport<'a>(pub &'a GameSnapshot);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        writeln!(
            f,
            "----------------------------------------------- tick {}",
            snapshot.tick
        )?;

        for player in &snapshot.players {
            let index = player
                .index
                .map(|i| i.to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(f, "{} ({}): {} credits", player.handle, index, player.credits)?;

            for server in &player.servers {
                write_server(f, server, "    ")?;
            }

            if !player.known_servers.is_empty() {
                writeln!(f, "    Known servers")?;
                for server in &player.known_servers {
                    write_server(f, server, "        ")?;
                }
            }
        }
        Ok(())
    }
}

pub fn render_snapshot_text(snapshot: &GameSnapshot) -> String {
    TextReport(snapshot).to_string()
}

pub fn render_text(game: &Game) -> String {
    render_snapshot_text(&snapshot(game))
}

pub fn render(game: &Game, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(render_text(game)),
        ReportFormat::Json => serde_json::to_string(&snapshot(game)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use shared::ServerRef;

    fn at(player: usize, slot: usize) -> ServerRef {
        ServerRef::new(PlayerId(player), slot)
    }

    fn game() -> Game {
        let mut game = Game::with_seed(21);
        game.create_player("Bob");
        game.create_player("Mary");
        game
    }

    #[test]
    fn test_snapshot_of_fresh_game() {
        let game = game();
        let snap = snapshot(&game);

        assert_eq!(snap.tick, 0);
        assert_eq!(snap.game_id, game.id().to_string());
        assert_eq!(snap.players.len(), 2);
        assert_eq!(snap.players[0].credits, 1);
        assert_eq!(snap.players[0].servers.len(), 3);
        assert!(snap.players[0].servers.iter().all(|s| s.weaknesses.is_empty()));
    }

    #[test]
    fn test_known_servers_hide_owner_state() {
        let mut game = game();
        game.assign(at(1, 0), Command::mine()).unwrap();
        game.assign(at(0, 0), Command::nmap("1.1.1.1")).unwrap();
        game.resolve();

        let snap = snapshot(&game);
        let known = &snap.players[0].known_servers[0];
        assert_eq!(known.address, game.server(at(1, 0)).unwrap().address);
        assert_eq!(known.command, None);
        assert_eq!(known.post_result, None);

        let own = &snap.players[1].servers[0];
        assert_eq!(own.command.as_deref(), Some("mine"));
        assert_eq!(own.cycles_left, Some(1));
    }

    #[test]
    fn test_weaknesses_filtered_by_viewer() {
        let mut game = game();
        game.assign(at(0, 0), Command::probe(at(1, 2))).unwrap();
        game.resolve();
        game.resolve();

        let snap = snapshot(&game);
        assert_eq!(snap.players[1].servers[2].weaknesses.len(), 0);

        let text = render_text(&game);
        assert!(text.contains("Found '"));
    }

    #[test]
    fn test_text_layout() {
        let mut game = game();
        game.assign(at(0, 1), Command::nmap("*.*.*.*")).unwrap();
        game.resolve();

        let text = render_text(&game);
        assert!(text.starts_with("----------------------------------------------- tick 1\n"));
        assert!(text.contains("Bob (0): 1 credits\n"));
        assert!(text.contains("Mary (1): 1 credits\n"));
        assert!(text.contains("    nmap *.*.*.*, 3 cycle(s) left\n"));
        assert!(text.contains("    > Bob running 'nmap' against *.*.*.*\n"));
        assert!(!text.contains("Known servers"));
    }

    #[test]
    fn test_unregistered_player_layout() {
        let snap = GameSnapshot {
            game_id: "g".to_string(),
            tick: 2,
            players: vec![PlayerView {
                handle: "Ann".to_string(),
                index: None,
                credits: 1,
                servers: vec![],
                known_servers: vec![],
            }],
        };

        assert_eq!(
            TextReport(&snap).to_string(),
            "----------------------------------------------- tick 2\nAnn (-): 1 credits\n"
        );
    }

    #[test]
    fn test_json_render() {
        let game = game();
        let json = render(&game, ReportFormat::Json).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot(&game));
    }
}
