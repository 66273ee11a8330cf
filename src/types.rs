// Core game vocabulary shared by the graph, the evaluators and the search
// Node identifiers, tickets, transport modes, pieces and moves

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque positive identifier of a graph vertex
pub type NodeId = u32;

/// Ticket types a player can spend to move
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ticket {
    Taxi,
    Bus,
    Underground,
    Double,
    Secret,
}

impl Ticket {
    /// Returns all ticket types
    pub fn all() -> [Ticket; 5] {
        [
            Ticket::Taxi,
            Ticket::Bus,
            Ticket::Underground,
            Ticket::Double,
            Ticket::Secret,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ticket::Taxi => "taxi",
            Ticket::Bus => "bus",
            Ticket::Underground => "underground",
            Ticket::Double => "double",
            Ticket::Secret => "secret",
        }
    }
}

/// Transport modes that can connect two adjacent nodes
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Taxi,
    Bus,
    Underground,
    Ferry,
}

impl Transport {
    /// Returns all transport modes
    pub fn all() -> [Transport; 4] {
        [
            Transport::Taxi,
            Transport::Bus,
            Transport::Underground,
            Transport::Ferry,
        ]
    }

    /// Ticket needed to travel along an edge of this mode
    pub fn required_ticket(&self) -> Ticket {
        match self {
            Transport::Taxi => Ticket::Taxi,
            Transport::Bus => Ticket::Bus,
            Transport::Underground => Ticket::Underground,
            Transport::Ferry => Ticket::Secret,
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Transport::Taxi => 0b0001,
            Transport::Bus => 0b0010,
            Transport::Underground => 0b0100,
            Transport::Ferry => 0b1000,
        }
    }
}

/// Set of transport modes available on a single edge
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransportSet(u8);

impl TransportSet {
    pub fn empty() -> Self {
        TransportSet(0)
    }

    pub fn of(modes: &[Transport]) -> Self {
        let mut set = TransportSet::empty();
        for mode in modes {
            set.insert(*mode);
        }
        set
    }

    pub fn insert(&mut self, mode: Transport) {
        self.0 |= mode.bit();
    }

    pub fn contains(&self, mode: Transport) -> bool {
        self.0 & mode.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Transport> + '_ {
        Transport::all()
            .into_iter()
            .filter(move |mode| self.contains(*mode))
    }
}

/// The two sides of the game
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Evader,
    Seekers,
}

/// A single playing piece: the evader or one of the numbered seekers
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Piece {
    Evader,
    Seeker(u8),
}

impl Piece {
    pub fn is_evader(&self) -> bool {
        matches!(self, Piece::Evader)
    }

    pub fn side(&self) -> Side {
        match self {
            Piece::Evader => Side::Evader,
            Piece::Seeker(_) => Side::Seekers,
        }
    }

    /// Dense index: 0 for the evader, 1.. for seekers
    pub fn index(&self) -> usize {
        match self {
            Piece::Evader => 0,
            Piece::Seeker(n) => *n as usize + 1,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Piece::Evader => write!(f, "evader"),
            Piece::Seeker(n) => write!(f, "seeker-{}", n),
        }
    }
}

/// A legal move produced by the rules engine
///
/// Only the evader can make double moves; every seeker move is single.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Single {
        piece: Piece,
        source: NodeId,
        ticket: Ticket,
        destination: NodeId,
    },
    Double {
        piece: Piece,
        source: NodeId,
        first_ticket: Ticket,
        first_destination: NodeId,
        second_ticket: Ticket,
        second_destination: NodeId,
    },
}

impl Move {
    pub fn commenced_by(&self) -> Piece {
        match self {
            Move::Single { piece, .. } | Move::Double { piece, .. } => *piece,
        }
    }

    pub fn source(&self) -> NodeId {
        match self {
            Move::Single { source, .. } | Move::Double { source, .. } => *source,
        }
    }

    /// Where the moving piece ends up after the whole move
    pub fn destination(&self) -> NodeId {
        match self {
            Move::Single { destination, .. } => *destination,
            Move::Double {
                second_destination, ..
            } => *second_destination,
        }
    }

    /// Ticket spent on the first (or only) leg
    pub fn first_ticket(&self) -> Ticket {
        match self {
            Move::Single { ticket, .. } => *ticket,
            Move::Double { first_ticket, .. } => *first_ticket,
        }
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Move::Double { .. })
    }

    /// Travel tickets spent per leg, excluding the double-move ticket itself
    pub fn tickets(&self) -> Vec<Ticket> {
        match self {
            Move::Single { ticket, .. } => vec![*ticket],
            Move::Double {
                first_ticket,
                second_ticket,
                ..
            } => vec![*first_ticket, *second_ticket],
        }
    }

    pub fn uses_ticket(&self, ticket: Ticket) -> bool {
        self.tickets().contains(&ticket)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Single {
                piece,
                source,
                ticket,
                destination,
            } => write!(
                f,
                "{} {} -{}-> {}",
                piece,
                source,
                ticket.as_str(),
                destination
            ),
            Move::Double {
                piece,
                source,
                first_ticket,
                first_destination,
                second_ticket,
                second_destination,
            } => write!(
                f,
                "{} {} -{}-> {} -{}-> {}",
                piece,
                source,
                first_ticket.as_str(),
                first_destination,
                second_ticket.as_str(),
                second_destination
            ),
        }
    }
}
