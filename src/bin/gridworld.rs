use clap::{Parser, ValueEnum};
use gridworld_eval::{
    evaluate_policy, DeterministicPolicy, EvaluationConfig, GridWorld, Policy,
    UniformRandomPolicy,
};
use std::error::Error;

/// Evaluate a fixed policy on the Sutton & Barto 4.1 grid world and print
/// the converged state values.
#[derive(Parser)]
#[command(name = "gridworld", version)]
struct Cli {
    /// Side length of the grid
    #[arg(short = 'n', long, default_value_t = GridWorld::DEFAULT_SIZE)]
    size: usize,

    /// Discount factor
    #[arg(short, long, default_value_t = 1.0)]
    gamma: f64,

    /// Convergence threshold
    #[arg(short, long, default_value_t = 1e-4)]
    theta: f64,

    /// Stop with an error after this many sweeps
    #[arg(long, default_value_t = 10_000)]
    max_sweeps: usize,

    /// Policy to evaluate
    #[arg(short, long, value_enum, default_value_t = PolicyChoice::Uniform)]
    policy: PolicyChoice,

    /// Decimal places in the printed grid (at most 15)
    #[arg(short, long, default_value_t = 1)]
    decimals: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum PolicyChoice {
    /// Each move with probability 1/4
    Uniform,
    /// Left along the row, then up to the (0, 0) corner
    TowardOrigin,
}

impl PolicyChoice {
    fn build(self, env: &GridWorld) -> Box<dyn Policy> {
        match self {
            PolicyChoice::Uniform => Box::new(UniformRandomPolicy::new()),
            PolicyChoice::TowardOrigin => Box::new(DeterministicPolicy::toward_origin(env)),
        }
    }
}

impl Cli {
    fn config(&self) -> EvaluationConfig {
        EvaluationConfig::default()
            .with_gamma(self.gamma)
            .with_theta(self.theta)
            .with_max_sweeps(self.max_sweeps)
    }
}

fn run(cli: &Cli) -> Result<String, Box<dyn Error>> {
    let env = GridWorld::new(cli.size)?;
    let policy = cli.policy.build(&env);
    let evaluation = evaluate_policy(&env, policy.as_ref(), cli.config())?;
    Ok(evaluation.values.to_grid_string(cli.decimals.into()))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    println!("{}", run(&cli)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridworld_eval::Error as EvalError;

    #[test]
    fn test_defaults_cap_the_sweeps() {
        let cli = Cli::parse_from(["gridworld"]);
        assert_eq!(cli.policy, PolicyChoice::Uniform);
        assert_eq!(cli.config().max_sweeps, Some(10_000));
    }

    #[test]
    fn test_every_policy_choice_terminates() {
        for choice in ["uniform", "toward-origin"] {
            let cli = Cli::parse_from(["gridworld", "--policy", choice]);
            let grid = run(&cli).unwrap();
            assert_eq!(grid.lines().count(), 4, "{choice}: {grid}");
        }

        let cli = Cli::parse_from(["gridworld", "-p", "toward-origin", "-n", "3"]);
        assert_eq!(
            run(&cli).unwrap(),
            "[ 0.0 -1.0 -2.0]\n[-1.0 -2.0 -3.0]\n[-2.0 -3.0  0.0]"
        );
    }

    #[test]
    fn test_sweep_cap_ends_the_run() {
        let cli = Cli::parse_from(["gridworld", "--max-sweeps", "3"]);
        let err = run(&cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EvalError>(),
            Some(EvalError::NotConverged { sweeps: 3, .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_decimals() {
        assert!(Cli::try_parse_from(["gridworld", "--decimals", "300"]).is_err());
    }
}
