//! Typed operation surface, decoupled from any host runtime.
//!
//! [`Command`] is the instruction set of the ledger: every operation a
//! caller can invoke is a variant carrying its parsed arguments.
//! [`Command::parse`] maps an operation name plus positional string
//! arguments (the calling convention of host runtimes) onto a typed
//! command; [`Dispatcher`] routes commands to the service and the solver
//! capability.

use super::error::TransferError;
use super::lot::{Lot, LotDraft, LotStatus};
use super::service::TransferService;
use super::solver::{LpModel, LpSolution, SimplexSolver, Solver};
use bech32::Bech32m;
use uuid7::uuid7;

/// Names accepted by [`Command::parse`], in the order their handlers are
/// listed there.
pub const OPERATIONS: &[&str] = &[
    "init",
    "create",
    "read",
    "transfer",
    "delete",
    "purchase",
    "solve",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Seed the ledger with the fixture lot.
    InitLedger,
    /// Record a new lot under a caller-supplied key.
    Create { key: String, draft: LotDraft },
    Read {
        key: String,
    },
    Transfer {
        key: String,
        new_owner: String,
    },
    Delete {
        key: String,
    },
    Purchase {
        key: String,
        new_owner: String,
        quantity: u32,
    },
    /// Hand a minimization model to the solver capability.
    Solve {
        vars: usize,
        constraints: usize,
        objective: String,
        matrix: String,
        rhs: String,
    },
}

impl Command {
    /// Build a typed command from an operation name and positional string
    /// arguments. Unknown names, wrong arity and malformed numbers are all
    /// caller errors.
    pub fn parse(name: &str, args: &[String]) -> Result<Self, TransferError> {
        match name {
            "init" => {
                expect_args(name, args, 0)?;
                Ok(Self::InitLedger)
            }
            "create" => {
                expect_args(name, args, 12)?;
                let quantity = parse_quantity(&args[5])?;
                let status: LotStatus = args[8].parse()?;
                Ok(Self::Create {
                    key: args[0].clone(),
                    draft: LotDraft::new()
                        .set_product_id(&args[1])
                        .set_name(&args[2])
                        .set_owner(&args[3])
                        .set_value(&args[4])
                        .set_quantity(quantity)
                        .set_expiration_date(&args[6])
                        .set_manufactured_date(&args[7])
                        .set_status(status)
                        .set_issue_date(&args[9])
                        .set_supplier(&args[10])
                        .set_demander(&args[11]),
                })
            }
            "read" => {
                expect_args(name, args, 1)?;
                Ok(Self::Read {
                    key: args[0].clone(),
                })
            }
            "transfer" => {
                expect_args(name, args, 2)?;
                Ok(Self::Transfer {
                    key: args[0].clone(),
                    new_owner: args[1].clone(),
                })
            }
            "delete" => {
                expect_args(name, args, 1)?;
                Ok(Self::Delete {
                    key: args[0].clone(),
                })
            }
            "purchase" => {
                expect_args(name, args, 3)?;
                Ok(Self::Purchase {
                    key: args[0].clone(),
                    new_owner: args[1].clone(),
                    quantity: parse_quantity(&args[2])?,
                })
            }
            "solve" => {
                expect_args(name, args, 5)?;
                Ok(Self::Solve {
                    vars: parse_count(&args[0])?,
                    constraints: parse_count(&args[1])?,
                    objective: args[2].clone(),
                    matrix: args[3].clone(),
                    rhs: args[4].clone(),
                })
            }
            other => Err(TransferError::invalid(format!(
                "unknown operation \"{other}\""
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::InitLedger => "init",
            Command::Create { .. } => "create",
            Command::Read { .. } => "read",
            Command::Transfer { .. } => "transfer",
            Command::Delete { .. } => "delete",
            Command::Purchase { .. } => "purchase",
            Command::Solve { .. } => "solve",
        }
    }
}

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Lot(Lot),
    Deleted { key: String },
    Solved(LpSolution),
}

/// Stateless router from commands to the service and solver.
pub struct Dispatcher {
    service: TransferService,
    solver: Box<dyn Solver>,
}

impl Dispatcher {
    pub fn new(service: TransferService) -> Self {
        Self::with_solver(service, Box::new(SimplexSolver))
    }

    pub fn with_solver(service: TransferService, solver: Box<dyn Solver>) -> Self {
        Self { service, solver }
    }

    /// Parse and dispatch in one step; the string-argument entry point a
    /// host runtime would call.
    pub fn invoke(&self, name: &str, args: &[String]) -> anyhow::Result<Outcome> {
        self.dispatch(Command::parse(name, args)?)
    }

    /// Execute one typed command against the ledger.
    pub fn dispatch(&self, command: Command) -> anyhow::Result<Outcome> {
        let txn = invocation_id()?;
        tracing::debug!(txn = %txn, op = command.name(), "dispatching");

        match command {
            Command::InitLedger => Ok(Outcome::Lot(self.service.init_ledger()?)),
            Command::Create { key, draft } => Ok(Outcome::Lot(self.service.add_lot(&key, draft)?)),
            Command::Read { key } => Ok(Outcome::Lot(self.service.lot_by_key(&key)?)),
            Command::Transfer { key, new_owner } => {
                Ok(Outcome::Lot(self.service.change_ownership(&key, &new_owner)?))
            }
            Command::Delete { key } => {
                self.service.delete_lot(&key)?;
                Ok(Outcome::Deleted { key })
            }
            Command::Purchase {
                key,
                new_owner,
                quantity,
            } => Ok(Outcome::Lot(self.service.purchase(&key, &new_owner, quantity)?)),
            Command::Solve {
                vars,
                constraints,
                objective,
                matrix,
                rhs,
            } => {
                let model = LpModel::parse(vars, constraints, &objective, &matrix, &rhs)?;
                Ok(Outcome::Solved(self.solver.solve(&model)?))
            }
        }
    }
}

// Unique id stamped on every invocation for the audit log.
fn invocation_id() -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse("txn")?;
    Ok(bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?)
}

fn expect_args(name: &str, args: &[String], want: usize) -> Result<(), TransferError> {
    if args.len() != want {
        return Err(TransferError::invalid(format!(
            "operation \"{name}\" takes {want} argument(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

fn parse_quantity(raw: &str) -> Result<u32, TransferError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| TransferError::invalid(format!("quantity \"{raw}\" is not a non-negative integer")))
}

fn parse_count(raw: &str) -> Result<usize, TransferError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| TransferError::invalid(format!("dimension \"{raw}\" is not a non-negative integer")))
}
