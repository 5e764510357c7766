use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use commonware_utils::hex;
use serde::Serialize;

use crate::codec::{
    opt_bytes32_encode_size, read_bytes32, read_opt_bytes32, write_bytes32, write_opt_bytes32,
};
use crate::constants::{BASIS_POINTS, GRID_DIM, VALUE_LEN};
use crate::ActorId;

/// Lifecycle of a game, derived from its flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    /// Created; the external random value has not arrived yet.
    AwaitingRandomness,
    /// Randomness fulfilled; the secret has not been revealed.
    AwaitingFirstReveal,
    /// Seed derived; cells are being revealed.
    Playing,
    /// A mine was revealed. Terminal.
    Lost,
    /// The pot was paid out to the principal. Terminal.
    CashedOut,
}

/// Recoverable status of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CellStatus {
    Hidden,
    Safe,
    Mine,
}

/// True iff the coordinate lies on the grid.
pub fn in_bounds(x: u8, y: u8) -> bool {
    x < GRID_DIM && y < GRID_DIM
}

/// Bit index of a cell in the revealed mask. Caller validates bounds.
pub fn cell_index(x: u8, y: u8) -> u32 {
    (y as u32) * (GRID_DIM as u32) + (x as u32)
}

/// Per-game state, keyed externally by the gateway-issued request id.
///
/// The record is never physically destroyed: terminal games stay in the
/// registry so recovery and audit reads keep working.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    /// Owning actor. Immutable, never [`ActorId::ZERO`].
    pub principal: ActorId,
    /// Net stake after the randomness fee.
    pub wager: u64,
    /// Current pot. Starts at `wager`, grows on safe reveals, zeroed on loss.
    pub pot: u64,
    /// Hash of the player secret, fixed at creation.
    pub commitment: [u8; VALUE_LEN],
    /// External random value; `None` until the gateway fulfills.
    pub external_random: Option<[u8; VALUE_LEN]>,
    /// Player secret; `None` until revealed on the first move.
    pub secret: Option<[u8; VALUE_LEN]>,
    /// Derived seed; `None` until both inputs are known.
    pub seed: Option<[u8; VALUE_LEN]>,
    /// One bit per cell (index `y*10 + x`), set at most once, never cleared.
    pub revealed_mask: u128,
    /// The mine that ended the game, if any.
    pub exploded_cell: Option<(u8, u8)>,
    pub active: bool,
    pub lost: bool,
    pub secret_revealed: bool,
}

impl Game {
    pub fn new(principal: ActorId, commitment: [u8; VALUE_LEN], wager: u64) -> Self {
        Self {
            principal,
            wager,
            pot: wager,
            commitment,
            external_random: None,
            secret: None,
            seed: None,
            revealed_mask: 0,
            exploded_cell: None,
            active: true,
            lost: false,
            secret_revealed: false,
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.lost {
            GameStatus::Lost
        } else if !self.active {
            GameStatus::CashedOut
        } else if self.external_random.is_none() {
            GameStatus::AwaitingRandomness
        } else if !self.secret_revealed {
            GameStatus::AwaitingFirstReveal
        } else {
            GameStatus::Playing
        }
    }

    pub fn is_revealed(&self, x: u8, y: u8) -> bool {
        self.revealed_mask & (1u128 << cell_index(x, y)) != 0
    }

    /// Set a cell's bit. Caller validates bounds and that the bit is clear.
    pub fn mark_revealed(&mut self, x: u8, y: u8) {
        self.revealed_mask |= 1u128 << cell_index(x, y);
    }

    pub fn revealed_count(&self) -> u32 {
        self.revealed_mask.count_ones()
    }

    /// All revealed cells that were safe, in row-major order.
    pub fn revealed_safe_cells(&self) -> Vec<(u8, u8)> {
        let mut cells = Vec::with_capacity(self.revealed_count() as usize);
        for y in 0..GRID_DIM {
            for x in 0..GRID_DIM {
                if self.is_revealed(x, y) && self.exploded_cell != Some((x, y)) {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    pub fn cell_status(&self, x: u8, y: u8) -> CellStatus {
        if !self.is_revealed(x, y) {
            CellStatus::Hidden
        } else if self.exploded_cell == Some((x, y)) {
            CellStatus::Mine
        } else {
            CellStatus::Safe
        }
    }

    /// Multiply the pot by `multiplier_bps / 10_000`, truncating. Saturates
    /// at `u64::MAX` rather than overflowing.
    pub fn grow_pot(&mut self, multiplier_bps: u64) {
        let grown = (self.pot as u128) * (multiplier_bps as u128) / (BASIS_POINTS as u128);
        self.pot = grown.min(u64::MAX as u128) as u64;
    }

    /// Whether observers may see the seed: only once the game is finished and
    /// the secret is out, so nobody can precompute the remaining grid.
    pub fn seed_visible(&self) -> bool {
        (!self.active || self.lost) && self.secret_revealed
    }

    pub fn summary(&self, game_id: u64) -> GameSummary {
        GameSummary {
            game_id,
            principal: self.principal,
            status: self.status(),
            wager: self.wager,
            pot: self.pot,
            revealed_cells: self.revealed_count(),
            commitment: hex(&self.commitment),
            seed: if self.seed_visible() {
                self.seed.map(|seed| hex(&seed))
            } else {
                None
            },
        }
    }
}

/// Serializable recovery view of a game.
///
/// The seed is withheld while the game is in flight; see
/// [`Game::seed_visible`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub game_id: u64,
    pub principal: ActorId,
    pub status: GameStatus,
    pub wager: u64,
    pub pot: u64,
    pub revealed_cells: u32,
    pub commitment: String,
    pub seed: Option<String>,
}

impl Write for Game {
    fn write(&self, writer: &mut impl BufMut) {
        self.principal.write(writer);
        self.wager.write(writer);
        self.pot.write(writer);
        write_bytes32(&self.commitment, writer);
        write_opt_bytes32(&self.external_random, writer);
        write_opt_bytes32(&self.secret, writer);
        write_opt_bytes32(&self.seed, writer);
        self.revealed_mask.write(writer);
        match self.exploded_cell {
            Some((x, y)) => {
                writer.put_u8(1);
                writer.put_u8(x);
                writer.put_u8(y);
            }
            None => writer.put_u8(0),
        }
        self.active.write(writer);
        self.lost.write(writer);
        self.secret_revealed.write(writer);
    }
}

impl Read for Game {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let principal = ActorId::read(reader)?;
        if principal.is_zero() {
            return Err(Error::Invalid("Game", "zero principal"));
        }
        let wager = u64::read(reader)?;
        let pot = u64::read(reader)?;
        let commitment = read_bytes32(reader)?;
        let external_random = read_opt_bytes32(reader)?;
        let secret = read_opt_bytes32(reader)?;
        let seed = read_opt_bytes32(reader)?;
        let revealed_mask = u128::read(reader)?;
        if revealed_mask >> (GRID_DIM as u32 * GRID_DIM as u32) != 0 {
            return Err(Error::Invalid("Game", "mask has bits beyond the grid"));
        }
        let exploded_cell = {
            if reader.remaining() < 1 {
                return Err(Error::EndOfBuffer);
            }
            match reader.get_u8() {
                0 => None,
                1 => {
                    if reader.remaining() < 2 {
                        return Err(Error::EndOfBuffer);
                    }
                    let (x, y) = (reader.get_u8(), reader.get_u8());
                    if !in_bounds(x, y) {
                        return Err(Error::Invalid("Game", "exploded cell out of bounds"));
                    }
                    Some((x, y))
                }
                flag => return Err(Error::InvalidEnum(flag)),
            }
        };
        let active = bool::read(reader)?;
        let lost = bool::read(reader)?;
        let secret_revealed = bool::read(reader)?;

        Ok(Self {
            principal,
            wager,
            pot,
            commitment,
            external_random,
            secret,
            seed,
            revealed_mask,
            exploded_cell,
            active,
            lost,
            secret_revealed,
        })
    }
}

impl EncodeSize for Game {
    fn encode_size(&self) -> usize {
        self.principal.encode_size()
            + self.wager.encode_size()
            + self.pot.encode_size()
            + VALUE_LEN
            + opt_bytes32_encode_size(&self.external_random)
            + opt_bytes32_encode_size(&self.secret)
            + opt_bytes32_encode_size(&self.seed)
            + self.revealed_mask.encode_size()
            + (1 + if self.exploded_cell.is_some() { 2 } else { 0 })
            + self.active.encode_size()
            + self.lost.encode_size()
            + self.secret_revealed.encode_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::Encode;

    fn actor(byte: u8) -> ActorId {
        ActorId::new([byte; VALUE_LEN])
    }

    fn test_game() -> Game {
        Game::new(actor(1), [0x11u8; VALUE_LEN], 50)
    }

    #[test]
    fn new_game_awaits_randomness() {
        let game = test_game();
        assert_eq!(game.status(), GameStatus::AwaitingRandomness);
        assert_eq!(game.pot, 50);
        assert_eq!(game.revealed_count(), 0);
    }

    #[test]
    fn status_follows_lifecycle() {
        let mut game = test_game();
        game.external_random = Some([2u8; VALUE_LEN]);
        assert_eq!(game.status(), GameStatus::AwaitingFirstReveal);

        game.secret = Some([3u8; VALUE_LEN]);
        game.seed = Some([4u8; VALUE_LEN]);
        game.secret_revealed = true;
        assert_eq!(game.status(), GameStatus::Playing);

        let mut lost = game.clone();
        lost.lost = true;
        lost.active = false;
        lost.pot = 0;
        assert_eq!(lost.status(), GameStatus::Lost);

        game.active = false;
        assert_eq!(game.status(), GameStatus::CashedOut);
    }

    #[test]
    fn mask_bits_are_independent() {
        let mut game = test_game();
        game.mark_revealed(3, 4);
        assert!(game.is_revealed(3, 4));
        assert!(!game.is_revealed(4, 3));
        assert_eq!(game.revealed_count(), 1);

        game.mark_revealed(9, 9);
        game.mark_revealed(0, 0);
        assert_eq!(game.revealed_count(), 3);
    }

    #[test]
    fn safe_cells_exclude_the_mine() {
        let mut game = test_game();
        game.mark_revealed(1, 1);
        game.mark_revealed(2, 2);
        game.exploded_cell = Some((2, 2));

        assert_eq!(game.revealed_safe_cells(), vec![(1, 1)]);
        assert_eq!(game.cell_status(1, 1), CellStatus::Safe);
        assert_eq!(game.cell_status(2, 2), CellStatus::Mine);
        assert_eq!(game.cell_status(5, 5), CellStatus::Hidden);
    }

    #[test]
    fn pot_growth_truncates() {
        let mut game = Game::new(actor(1), [0u8; VALUE_LEN], 10);
        game.grow_pot(12_000);
        assert_eq!(game.pot, 12);
        game.grow_pot(12_000);
        // 12 * 1.2 = 14.4, truncated.
        assert_eq!(game.pot, 14);
    }

    #[test]
    fn pot_growth_saturates() {
        let mut game = Game::new(actor(1), [0u8; VALUE_LEN], u64::MAX);
        game.grow_pot(20_000);
        assert_eq!(game.pot, u64::MAX);
    }

    #[test]
    fn seed_withheld_until_finished() {
        let mut game = test_game();
        game.external_random = Some([2u8; VALUE_LEN]);
        game.secret = Some([3u8; VALUE_LEN]);
        game.seed = Some([4u8; VALUE_LEN]);
        game.secret_revealed = true;

        // Mid-game: no seed in the summary.
        assert!(!game.seed_visible());
        assert_eq!(game.summary(7).seed, None);

        // Finished: seed exposed.
        game.active = false;
        assert!(game.seed_visible());
        let summary = game.summary(7);
        assert_eq!(summary.seed.as_deref(), Some(hex(&[4u8; VALUE_LEN]).as_str()));
        assert_eq!(summary.game_id, 7);
        assert_eq!(summary.revealed_cells, 0);
    }

    #[test]
    fn seed_withheld_without_secret_reveal() {
        // A game abandoned before the first reveal never exposes a seed,
        // even once observers consider it dead.
        let mut game = test_game();
        game.external_random = Some([2u8; VALUE_LEN]);
        game.active = false;
        assert!(!game.seed_visible());
    }

    #[test]
    fn summary_serializes_for_observers() {
        let mut game = test_game();
        game.mark_revealed(3, 4);

        let json = serde_json::to_value(game.summary(42)).expect("json");
        assert_eq!(json["game_id"], 42);
        assert_eq!(json["status"], "AwaitingRandomness");
        assert_eq!(json["revealed_cells"], 1);
        assert_eq!(json["seed"], serde_json::Value::Null);
        assert_eq!(json["commitment"], hex(&[0x11u8; VALUE_LEN]));
    }

    #[test]
    fn codec_roundtrip() {
        let mut game = test_game();
        game.external_random = Some([2u8; VALUE_LEN]);
        game.secret = Some([3u8; VALUE_LEN]);
        game.seed = Some([4u8; VALUE_LEN]);
        game.secret_revealed = true;
        game.mark_revealed(3, 4);
        game.mark_revealed(0, 9);
        game.exploded_cell = Some((0, 9));
        game.lost = true;
        game.active = false;
        game.pot = 0;

        let encoded = game.encode();
        assert_eq!(encoded.len(), game.encode_size());

        let mut reader = encoded.as_ref();
        let decoded = Game::read(&mut reader).expect("decode");
        assert_eq!(decoded, game);
    }

    #[test]
    fn codec_rejects_zero_principal() {
        let mut game = test_game();
        game.principal = ActorId::ZERO;
        let encoded = game.encode();
        let mut reader = encoded.as_ref();
        assert!(matches!(
            Game::read(&mut reader),
            Err(Error::Invalid("Game", "zero principal"))
        ));
    }

    #[test]
    fn codec_rejects_out_of_grid_mask() {
        let mut game = test_game();
        game.revealed_mask = 1u128 << 100;
        let encoded = game.encode();
        let mut reader = encoded.as_ref();
        assert!(Game::read(&mut reader).is_err());
    }
}
