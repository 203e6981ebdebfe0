//! Process-startup configuration: CLI flags with environment-variable
//! fallbacks, in the style of a small clap-derive binary.

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "gridmatch-server", about = "In-memory score-proximity matchmaking service")]
pub struct Config {
    /// Seconds; the nominal maximum wait before auto-removal.
    #[arg(long, env = "GRIDMATCH_MAX_TIME", default_value_t = 180)]
    pub max_time: i64,

    /// Upper bound on player score.
    #[arg(long, env = "GRIDMATCH_MAX_SCORE", default_value_t = 300)]
    pub max_score: i64,

    /// Score-axis bucket width; must yield at most 1000 score bands.
    #[arg(long, env = "GRIDMATCH_SCORE_GROUP_LEN", default_value_t = 10)]
    pub score_group_len: i64,

    /// Number of players per formed group.
    #[arg(long, env = "GRIDMATCH_MATCH_COUNT", default_value_t = 25)]
    pub match_count: usize,

    /// Listen address for the HTTP API.
    #[arg(long, env = "GRIDMATCH_BIND", default_value = "0.0.0.0:8000")]
    pub bind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = Config::parse_from(["gridmatch-server"]);
        assert_eq!(cfg.max_time, 180);
        assert_eq!(cfg.max_score, 300);
        assert_eq!(cfg.score_group_len, 10);
        assert_eq!(cfg.match_count, 25);
        assert_eq!(cfg.bind, "0.0.0.0:8000");
    }
}
