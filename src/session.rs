// ABOUTME: Presentation session state machine for the banana-slides client
// ABOUTME: Tracks the cursor through one deck from start to completion

use crate::slide::{Slide, SlideDeck};
use chrono::{DateTime, Utc};
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

/// Where a session currently is in its deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationState {
    Idle,
    Rendering { cursor: usize },
    Complete,
}

/// Result of driving the state machine one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Render the slide at this index, then wait for the next tick
    Show(usize),
    /// The last slide has been shown; render the completion view
    Completed,
    /// The deck had no slides; render the "no content" view
    Empty,
    /// The session was already terminal, nothing changed
    Halted,
}

/// One run of presenting a deck. Built fresh for every successful generate.
#[derive(Debug, Clone)]
pub struct PresentationSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    deck: Arc<SlideDeck>,
    state: PresentationState,
}

impl PresentationSession {
    pub fn new(deck: SlideDeck) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            deck: Arc::new(deck),
            state: PresentationState::Idle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deck(&self) -> &Arc<SlideDeck> {
        &self.deck
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == PresentationState::Complete
    }

    /// Position in the deck; equals the deck length once complete.
    pub fn cursor(&self) -> usize {
        match self.state {
            PresentationState::Idle => 0,
            PresentationState::Rendering { cursor } => cursor,
            PresentationState::Complete => self.deck.len(),
        }
    }

    /// The slide under the cursor, if one is being rendered
    pub fn current_slide(&self) -> Option<&Slide> {
        match self.state {
            PresentationState::Rendering { cursor } => self.deck.get(cursor),
            _ => None,
        }
    }

    /// Leave Idle. Any later call behaves like `advance`.
    pub fn start(&mut self) -> Transition {
        if self.state != PresentationState::Idle {
            return self.advance();
        }

        let transition = if self.deck.is_empty() {
            self.state = PresentationState::Complete;
            Transition::Empty
        } else {
            self.state = PresentationState::Rendering { cursor: 0 };
            Transition::Show(0)
        };
        debug!("Session {} started: {:?}", self.id, transition);
        transition
    }

    /// Move the cursor forward by one slide
    pub fn advance(&mut self) -> Transition {
        let transition = match self.state {
            PresentationState::Idle => return self.start(),
            PresentationState::Rendering { cursor } => {
                let next = cursor + 1;
                if next >= self.deck.len() {
                    self.state = PresentationState::Complete;
                    Transition::Completed
                } else {
                    self.state = PresentationState::Rendering { cursor: next };
                    Transition::Show(next)
                }
            }
            PresentationState::Complete => Transition::Halted,
        };
        debug!("Session {} advanced: {:?}", self.id, transition);
        transition
    }
}
