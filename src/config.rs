use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{env, time::Duration};

use crate::models::GameType;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub dictionary: DictionaryConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryConfig {
    /// Base URL of the dictionary API; the word is appended as a path segment
    pub api_url: String,
    pub lookup_timeout_ms: u64,
    pub cache_path: String,
    pub flush_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub sudoku_max_players: usize,
    pub wordgrid_max_players: usize,
    pub sudoku_cells_to_remove: usize,
    pub word_grid_size: usize,
    /// Number of found words that ends a word-grid game
    pub words_to_finish: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.dictionaryapi.dev/api/v2/entries/en".to_string(),
            lookup_timeout_ms: 3000,
            cache_path: "./word-cache.json".to_string(),
            flush_interval_secs: 300,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            sudoku_max_players: 4,
            wordgrid_max_players: 6,
            sudoku_cells_to_remove: 50,
            word_grid_size: 5,
            words_to_finish: 10,
        }
    }
}

impl DictionaryConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

impl GameConfig {
    /// Directory cap advertised for a game type. Joins are not refused past it.
    pub fn max_players(&self, game_type: GameType) -> usize {
        match game_type {
            GameType::Sudoku => self.sudoku_max_players,
            GameType::WordGrid => self.wordgrid_max_players,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("{} must be a number", name))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", "3001")?,
        };

        let defaults = DictionaryConfig::default();
        let dictionary = DictionaryConfig {
            api_url: env::var("DICTIONARY_API_URL").unwrap_or(defaults.api_url),
            lookup_timeout_ms: parse_var("DICTIONARY_TIMEOUT_MS", "3000")?,
            cache_path: env::var("WORD_CACHE_PATH").unwrap_or(defaults.cache_path),
            flush_interval_secs: parse_var("WORD_CACHE_FLUSH_SECS", "300")?,
        };

        let game = GameConfig {
            sudoku_max_players: parse_var("SUDOKU_MAX_PLAYERS", "4")?,
            wordgrid_max_players: parse_var("WORDGRID_MAX_PLAYERS", "6")?,
            sudoku_cells_to_remove: parse_var("SUDOKU_CELLS_TO_REMOVE", "50")?,
            word_grid_size: parse_var("WORD_GRID_SIZE", "5")?,
            words_to_finish: parse_var("WORDS_TO_FINISH", "10")?,
        };

        if !matches!(game.word_grid_size, 4 | 5) {
            bail!("WORD_GRID_SIZE must be 4 or 5, got {}", game.word_grid_size);
        }
        if game.sudoku_cells_to_remove > 81 {
            bail!(
                "SUDOKU_CELLS_TO_REMOVE must be at most 81, got {}",
                game.sudoku_cells_to_remove
            );
        }

        Ok(Config {
            server,
            dictionary,
            game,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_game_config_caps() {
        let game = GameConfig::default();
        assert_eq!(game.max_players(GameType::Sudoku), 4);
        assert_eq!(game.max_players(GameType::WordGrid), 6);
        assert_eq!(game.sudoku_cells_to_remove, 50);
        assert_eq!(game.words_to_finish, 10);
    }

    #[test]
    fn test_dictionary_durations() {
        let dictionary = DictionaryConfig::default();
        assert_eq!(dictionary.lookup_timeout(), Duration::from_secs(3));
        assert_eq!(dictionary.flush_interval(), Duration::from_secs(300));
    }
}
