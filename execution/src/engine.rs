//! The game state machine and its registry.
//!
//! Lifecycle per game:
//! `AwaitingRandomness -> AwaitingFirstReveal -> Playing -> {Lost, CashedOut}`.
//!
//! Every mutating operation validates all of its preconditions before
//! touching any state, so a returned error always means "nothing happened".
//! The only fallible step that runs after validation is the custody transfer
//! on cash-out, and it runs before the game record is written.
//!
//! There is deliberately no timeout or refund path: a game whose randomness
//! was fulfilled but whose secret is never revealed stays pending, with its
//! stake locked, indefinitely.

use std::collections::BTreeMap;

use minefield_types::{
    in_bounds, ActorId, CellStatus, Error, Event, Game, GameParameter, GameSummary,
};

use crate::cell_oracle;
use crate::commit_reveal;
use crate::custody::FundsCustody;
use crate::gateway::RandomnessSource;
use crate::governor::ParameterGovernor;
use crate::session::SessionAuthority;

/// Owns all shared state (game registry, delegate map, governed parameters)
/// and mediates every mutation through checked operations.
pub struct Engine<R: RandomnessSource, C: FundsCustody> {
    games: BTreeMap<u64, Game>,
    sessions: SessionAuthority,
    governor: ParameterGovernor,
    gateway: R,
    custody: C,
}

impl<R: RandomnessSource, C: FundsCustody> Engine<R, C> {
    pub fn new(gateway: R, custody: C, authority: ActorId) -> Self {
        Self {
            games: BTreeMap::new(),
            sessions: SessionAuthority::new(),
            governor: ParameterGovernor::new(authority),
            gateway,
            custody,
        }
    }

    // === Game operations ===

    /// Place a wager and request unpredictability.
    ///
    /// The payment covers the gateway fee; the remainder is the net wager and
    /// becomes the starting pot. Returns the gateway-issued id that keys the
    /// game from here on.
    pub fn start_game(
        &mut self,
        caller: ActorId,
        commitment: [u8; 32],
        payment: u64,
    ) -> Result<(u64, Vec<Event>), Error> {
        if caller.is_zero() {
            return Err(Error::Unauthorized);
        }
        let fee = self.gateway.fee();
        if payment < fee {
            return Err(Error::InsufficientPayment {
                supplied: payment,
                fee,
            });
        }
        let wager = payment - fee;
        if wager == 0 {
            return Err(Error::ZeroWager);
        }

        let game_id = self.gateway.request(fee)?;
        // A correct gateway never reissues an id, but a collision must not
        // clobber the existing game.
        if self.games.contains_key(&game_id) {
            return Err(Error::DuplicateId(game_id));
        }

        self.games.insert(game_id, Game::new(caller, commitment, wager));
        tracing::debug!(
            game_id = game_id,
            principal = ?caller,
            wager = wager,
            "game requested"
        );
        Ok((
            game_id,
            vec![Event::GameRequested {
                game_id,
                principal: caller,
                wager,
                commitment,
            }],
        ))
    }

    /// Entry point for the randomness source's out-of-band fulfillment.
    ///
    /// Invoked by the hosting environment, not by players. Safe under any
    /// arrival order relative to operations on other games; ids are unique
    /// per game.
    pub fn fulfill_randomness(
        &mut self,
        game_id: u64,
        value: [u8; 32],
    ) -> Result<Vec<Event>, Error> {
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(Error::GameNotFound(game_id))?;
        if game.external_random.is_some() {
            return Err(Error::DuplicateId(game_id));
        }

        game.external_random = Some(value);
        tracing::debug!(game_id = game_id, "randomness fulfilled");
        Ok(vec![Event::RandomnessFulfilled { game_id }])
    }

    /// Reveal one cell. The first reveal must carry the secret matching the
    /// game's commitment; every later reveal must not.
    ///
    /// On a safe cell the pot grows by the reward multiplier currently in
    /// effect; on a mine the game is lost and the pot zeroed.
    pub fn reveal_cell(
        &mut self,
        caller: ActorId,
        game_id: u64,
        x: u8,
        y: u8,
        secret: Option<[u8; 32]>,
    ) -> Result<Vec<Event>, Error> {
        let mine_probability_bps = self.governor.mine_probability_bps();
        let reward_multiplier_bps = self.governor.reward_multiplier_bps();

        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(Error::GameNotFound(game_id))?;
        if !self.sessions.authorized(&game.principal, &caller) {
            return Err(Error::Unauthorized);
        }
        if !game.active {
            return Err(Error::GameFinished(game_id));
        }
        if !in_bounds(x, y) {
            return Err(Error::InvalidCoordinate { x, y });
        }
        if game.is_revealed(x, y) {
            return Err(Error::CellAlreadyRevealed { x, y });
        }

        let mut events = Vec::with_capacity(2);
        let seed = if !game.secret_revealed {
            // Inline binder reveal: all checks first, then bind the secret
            // and derive the seed exactly once.
            let external = game
                .external_random
                .ok_or(Error::RandomnessNotReady(game_id))?;
            let secret = secret.ok_or(Error::CommitMismatch)?;
            if !commit_reveal::verify_commitment(&game.commitment, &secret) {
                return Err(Error::CommitMismatch);
            }

            let seed = commit_reveal::derive_seed(&external, &secret, &game.principal);
            game.secret = Some(secret);
            game.secret_revealed = true;
            game.seed = Some(seed);
            events.push(Event::SecretRevealed { game_id });
            tracing::debug!(game_id = game_id, "secret revealed, seed derived");
            seed
        } else {
            if secret.is_some() {
                return Err(Error::AlreadyRevealed(game_id));
            }
            game.seed.ok_or(Error::SeedNotReady(game_id))?
        };

        game.mark_revealed(x, y);
        if cell_oracle::is_unsafe(&seed, x, y, mine_probability_bps) {
            game.lost = true;
            game.active = false;
            game.pot = 0;
            game.exploded_cell = Some((x, y));
            events.push(Event::CellRevealed {
                game_id,
                x,
                y,
                mine: true,
                pot: 0,
            });
            events.push(Event::GameEnded {
                game_id,
                principal: game.principal,
                won: false,
                payout: 0,
            });
            tracing::info!(game_id = game_id, x = x, y = y, "mine revealed, game lost");
        } else {
            game.grow_pot(reward_multiplier_bps);
            events.push(Event::CellRevealed {
                game_id,
                x,
                y,
                mine: false,
                pot: game.pot,
            });
            tracing::debug!(
                game_id = game_id,
                x = x,
                y = y,
                pot = game.pot,
                "safe cell revealed"
            );
        }
        Ok(events)
    }

    /// Pay the pot out to the principal and end the game.
    ///
    /// A delegate may trigger this, but the transfer target is always the
    /// principal. A failed transfer aborts the operation with the game
    /// exactly as it was, so the caller may retry.
    pub fn cash_out(&mut self, caller: ActorId, game_id: u64) -> Result<Vec<Event>, Error> {
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(Error::GameNotFound(game_id))?;
        if !self.sessions.authorized(&game.principal, &caller) {
            return Err(Error::Unauthorized);
        }
        if game.lost {
            return Err(Error::AlreadyLost(game_id));
        }
        if !game.active {
            return Err(Error::GameFinished(game_id));
        }
        if !game.secret_revealed {
            return Err(Error::SeedNotReady(game_id));
        }

        let principal = game.principal;
        let payout = game.pot;
        if self.custody.transfer(&principal, payout).is_err() {
            tracing::warn!(game_id = game_id, payout = payout, "payout transfer failed");
            return Err(Error::TransferFailed { amount: payout });
        }

        game.active = false;
        tracing::info!(
            game_id = game_id,
            principal = ?principal,
            payout = payout,
            "game cashed out"
        );
        Ok(vec![Event::GameEnded {
            game_id,
            principal,
            won: true,
            payout,
        }])
    }

    // === Delegation ===

    pub fn register_delegate(
        &mut self,
        caller: ActorId,
        delegate: ActorId,
    ) -> Result<Vec<Event>, Error> {
        self.sessions.register(caller, delegate)?;
        tracing::debug!(principal = ?caller, delegate = ?delegate, "delegate registered");
        Ok(vec![Event::DelegateRegistered {
            principal: caller,
            delegate,
        }])
    }

    pub fn revoke_delegate(
        &mut self,
        caller: ActorId,
        delegate: ActorId,
    ) -> Result<Vec<Event>, Error> {
        self.sessions.revoke(caller, delegate)?;
        tracing::debug!(principal = ?caller, delegate = ?delegate, "delegate revoked");
        Ok(vec![Event::DelegateRevoked {
            principal: caller,
            delegate,
        }])
    }

    // === Governance ===

    pub fn propose_parameter(
        &mut self,
        caller: ActorId,
        parameter: GameParameter,
        value: u64,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        let change = self.governor.propose(caller, parameter, value, now)?;
        Ok(vec![Event::ParameterChangeProposed {
            parameter,
            value,
            effective_at: change.effective_at,
        }])
    }

    pub fn execute_parameter(
        &mut self,
        caller: ActorId,
        parameter: GameParameter,
        now: u64,
    ) -> Result<Vec<Event>, Error> {
        let value = self.governor.execute(caller, parameter, now)?;
        tracing::info!(parameter = ?parameter, value = value, "parameter change applied");
        Ok(vec![Event::ParameterChangeApplied { parameter, value }])
    }

    pub fn cancel_parameter(
        &mut self,
        caller: ActorId,
        parameter: GameParameter,
    ) -> Result<Vec<Event>, Error> {
        self.governor.cancel(caller, parameter)?;
        Ok(vec![Event::ParameterChangeCancelled { parameter }])
    }

    // === Recovery views (pure reads) ===

    pub fn game(&self, game_id: u64) -> Option<&Game> {
        self.games.get(&game_id)
    }

    /// Revealed cells that were safe, for board reconstruction.
    pub fn revealed_safe_cells(&self, game_id: u64) -> Result<Vec<(u8, u8)>, Error> {
        let game = self.games.get(&game_id).ok_or(Error::GameNotFound(game_id))?;
        Ok(game.revealed_safe_cells())
    }

    pub fn cell_status(&self, game_id: u64, x: u8, y: u8) -> Result<CellStatus, Error> {
        let game = self.games.get(&game_id).ok_or(Error::GameNotFound(game_id))?;
        if !in_bounds(x, y) {
            return Err(Error::InvalidCoordinate { x, y });
        }
        Ok(game.cell_status(x, y))
    }

    /// Summary for observers; withholds the seed while the game is in
    /// flight.
    pub fn game_summary(&self, game_id: u64) -> Result<GameSummary, Error> {
        let game = self.games.get(&game_id).ok_or(Error::GameNotFound(game_id))?;
        Ok(game.summary(game_id))
    }

    /// Ids of every game owned by `principal`, for account recovery.
    pub fn games_of(&self, principal: &ActorId) -> Vec<u64> {
        self.games
            .iter()
            .filter(|(_, game)| game.principal == *principal)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn sessions(&self) -> &SessionAuthority {
        &self.sessions
    }

    pub fn governor(&self) -> &ParameterGovernor {
        &self.governor
    }

    pub fn gateway(&self) -> &R {
        &self.gateway
    }

    /// Mutable access for the host (e.g. fee adjustments on the source).
    pub fn gateway_mut(&mut self) -> &mut R {
        &mut self.gateway
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit_reveal::compute_commitment;
    use crate::mocks::{
        create_actor, create_engine, create_secret, external_value, MockEngine, FEE,
    };
    use minefield_types::GameStatus;

    /// Start a game and fulfill its randomness; returns the id.
    fn started(engine: &mut MockEngine, principal: ActorId, secret: &[u8; 32], wager: u64) -> u64 {
        let commitment = compute_commitment(secret);
        let (game_id, _) = engine
            .start_game(principal, commitment, FEE + wager)
            .expect("start");
        engine
            .fulfill_randomness(game_id, external_value(game_id))
            .expect("fulfill");
        game_id
    }

    /// A cell with the given verdict under the engine's current threshold,
    /// excluding already-revealed cells.
    fn find_cell(engine: &MockEngine, game_id: u64, seed: &[u8; 32], mine: bool) -> (u8, u8) {
        let game = engine.game(game_id).expect("game");
        let threshold = engine.governor().mine_probability_bps();
        for y in 0..10u8 {
            for x in 0..10u8 {
                if !game.is_revealed(x, y)
                    && crate::cell_oracle::is_unsafe(seed, x, y, threshold) == mine
                {
                    return (x, y);
                }
            }
        }
        panic!("no matching cell");
    }

    fn derived_seed(engine: &MockEngine, game_id: u64, secret: &[u8; 32]) -> [u8; 32] {
        let game = engine.game(game_id).expect("game");
        crate::commit_reveal::derive_seed(
            &game.external_random.expect("fulfilled"),
            secret,
            &game.principal,
        )
    }

    #[test]
    fn start_validates_payment() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let commitment = compute_commitment(&create_secret(1));

        assert_eq!(
            engine.start_game(principal, commitment, FEE - 1),
            Err(Error::InsufficientPayment {
                supplied: FEE - 1,
                fee: FEE
            })
        );
        // Exactly the fee leaves nothing to wager.
        assert_eq!(
            engine.start_game(principal, commitment, FEE),
            Err(Error::ZeroWager)
        );
        assert_eq!(
            engine.start_game(ActorId::ZERO, commitment, FEE + 10),
            Err(Error::Unauthorized)
        );
    }

    #[test]
    fn start_creates_an_awaiting_game() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let commitment = compute_commitment(&create_secret(1));

        let (game_id, events) = engine
            .start_game(principal, commitment, FEE + 90)
            .expect("start");
        assert_eq!(
            events,
            vec![Event::GameRequested {
                game_id,
                principal,
                wager: 90,
                commitment,
            }]
        );

        let game = engine.game(game_id).expect("game");
        assert_eq!(game.status(), GameStatus::AwaitingRandomness);
        assert_eq!(game.pot, 90);
        assert_eq!(game.wager, 90);
    }

    #[test]
    fn duplicate_gateway_id_is_rejected() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let secret = create_secret(1);
        let game_id = started(&mut engine, principal, &secret, 90);

        // Force the gateway to reissue the same id.
        engine.gateway_mut().force_next_id(game_id);
        let commitment = compute_commitment(&create_secret(2));
        assert_eq!(
            engine.start_game(principal, commitment, FEE + 50),
            Err(Error::DuplicateId(game_id))
        );

        // The original game is untouched.
        let game = engine.game(game_id).expect("game");
        assert_eq!(game.wager, 90);
        assert_eq!(game.status(), GameStatus::AwaitingFirstReveal);
    }

    #[test]
    fn fulfillment_is_single_shot() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let secret = create_secret(1);
        let game_id = started(&mut engine, principal, &secret, 90);

        assert_eq!(
            engine.fulfill_randomness(game_id, external_value(7)),
            Err(Error::DuplicateId(game_id))
        );
        assert_eq!(
            engine.fulfill_randomness(game_id + 100, external_value(7)),
            Err(Error::GameNotFound(game_id + 100))
        );

        // The original value is retained.
        let game = engine.game(game_id).expect("game");
        assert_eq!(game.external_random, Some(external_value(game_id)));
    }

    #[test]
    fn reveal_requires_fulfilled_randomness() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let secret = create_secret(1);
        let commitment = compute_commitment(&secret);
        let (game_id, _) = engine
            .start_game(principal, commitment, FEE + 90)
            .expect("start");

        assert_eq!(
            engine.reveal_cell(principal, game_id, 0, 0, Some(secret)),
            Err(Error::RandomnessNotReady(game_id))
        );
    }

    #[test]
    fn first_reveal_verifies_the_commitment() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let secret = create_secret(1);
        let game_id = started(&mut engine, principal, &secret, 90);

        // Wrong secret and missing secret are both commit mismatches.
        assert_eq!(
            engine.reveal_cell(principal, game_id, 0, 0, Some(create_secret(2))),
            Err(Error::CommitMismatch)
        );
        assert_eq!(
            engine.reveal_cell(principal, game_id, 0, 0, None),
            Err(Error::CommitMismatch)
        );

        // Nothing was bound by the failed attempts.
        let game = engine.game(game_id).expect("game");
        assert!(!game.secret_revealed);
        assert_eq!(game.seed, None);
        assert_eq!(game.revealed_count(), 0);
    }

    #[test]
    fn first_reveal_binds_the_seed_once() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let secret = create_secret(1);
        let game_id = started(&mut engine, principal, &secret, 90);
        let seed = derived_seed(&engine, game_id, &secret);
        let (x, y) = find_cell(&engine, game_id, &seed, false);

        let events = engine
            .reveal_cell(principal, game_id, x, y, Some(secret))
            .expect("reveal");
        assert_eq!(events[0], Event::SecretRevealed { game_id });

        let game = engine.game(game_id).expect("game");
        assert_eq!(game.seed, Some(seed));
        assert_eq!(game.status(), GameStatus::Playing);

        // A second reveal carrying a secret is rejected, even the right one.
        let (x2, y2) = find_cell(&engine, game_id, &seed, false);
        assert_eq!(
            engine.reveal_cell(principal, game_id, x2, y2, Some(secret)),
            Err(Error::AlreadyRevealed(game_id))
        );
    }

    #[test]
    fn reveal_validates_coordinates_and_repeats() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let secret = create_secret(1);
        let game_id = started(&mut engine, principal, &secret, 90);
        let seed = derived_seed(&engine, game_id, &secret);
        let (x, y) = find_cell(&engine, game_id, &seed, false);

        assert_eq!(
            engine.reveal_cell(principal, game_id, 10, 0, Some(secret)),
            Err(Error::InvalidCoordinate { x: 10, y: 0 })
        );

        engine
            .reveal_cell(principal, game_id, x, y, Some(secret))
            .expect("reveal");
        assert_eq!(
            engine.reveal_cell(principal, game_id, x, y, None),
            Err(Error::CellAlreadyRevealed { x, y })
        );
    }

    #[test]
    fn reveal_rejects_strangers() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let stranger = create_actor(2);
        let secret = create_secret(1);
        let game_id = started(&mut engine, principal, &secret, 90);

        assert_eq!(
            engine.reveal_cell(stranger, game_id, 0, 0, Some(secret)),
            Err(Error::Unauthorized)
        );
        assert_eq!(engine.cash_out(stranger, game_id), Err(Error::Unauthorized));
    }

    #[test]
    fn cash_out_requires_a_revealed_secret() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let secret = create_secret(1);
        let game_id = started(&mut engine, principal, &secret, 90);

        assert_eq!(
            engine.cash_out(principal, game_id),
            Err(Error::SeedNotReady(game_id))
        );
    }

    #[test]
    fn cash_out_pays_the_principal_and_ends_the_game() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let secret = create_secret(1);
        let game_id = started(&mut engine, principal, &secret, 90);
        let seed = derived_seed(&engine, game_id, &secret);
        let (x, y) = find_cell(&engine, game_id, &seed, false);

        engine
            .reveal_cell(principal, game_id, x, y, Some(secret))
            .expect("reveal");
        let pot = engine.game(game_id).expect("game").pot;
        assert_eq!(pot, 108); // 90 * 1.2

        let events = engine.cash_out(principal, game_id).expect("cash out");
        assert_eq!(
            events,
            vec![Event::GameEnded {
                game_id,
                principal,
                won: true,
                payout: pot,
            }]
        );
        assert_eq!(engine.custody().balance(&principal), pot);

        let game = engine.game(game_id).expect("game");
        assert_eq!(game.status(), GameStatus::CashedOut);
        assert_eq!(
            engine.cash_out(principal, game_id),
            Err(Error::GameFinished(game_id))
        );
    }

    #[test]
    fn failed_transfer_rolls_back() {
        let mut engine = create_engine();
        let principal = create_actor(1);
        let secret = create_secret(1);
        let game_id = started(&mut engine, principal, &secret, 90);
        let seed = derived_seed(&engine, game_id, &secret);
        let (x, y) = find_cell(&engine, game_id, &seed, false);
        engine
            .reveal_cell(principal, game_id, x, y, Some(secret))
            .expect("reveal");

        engine.custody_mut().fail_next();
        let pot = engine.game(game_id).expect("game").pot;
        assert_eq!(
            engine.cash_out(principal, game_id),
            Err(Error::TransferFailed { amount: pot })
        );

        // The game is exactly as it was: still active, pot intact, so the
        // retry below succeeds.
        let game = engine.game(game_id).expect("game");
        assert!(game.active);
        assert_eq!(game.pot, pot);
        assert_eq!(engine.custody().balance(&principal), 0);

        engine.cash_out(principal, game_id).expect("retry");
        assert_eq!(engine.custody().balance(&principal), pot);
    }

    #[test]
    fn views_cover_missing_games() {
        let engine = create_engine();
        assert_eq!(engine.game_summary(1), Err(Error::GameNotFound(1)));
        assert_eq!(engine.revealed_safe_cells(1), Err(Error::GameNotFound(1)));
        assert_eq!(engine.cell_status(1, 0, 0), Err(Error::GameNotFound(1)));
        assert!(engine.game(1).is_none());
    }

    #[test]
    fn games_of_lists_only_the_principal() {
        let mut engine = create_engine();
        let alice = create_actor(1);
        let bob = create_actor(2);
        let id_a = started(&mut engine, alice, &create_secret(1), 90);
        let id_b = started(&mut engine, bob, &create_secret(2), 70);

        assert_eq!(engine.games_of(&alice), vec![id_a]);
        assert_eq!(engine.games_of(&bob), vec![id_b]);
        assert!(engine.games_of(&create_actor(3)).is_empty());
    }
}
