//! SQLite implementation of the CardStore trait.
//!
//! Each row keeps the card's wire JSON verbatim alongside a few indexed
//! columns. Cards are re-parsed through the crypto capability on load, and
//! their chain state is rebuilt by running the resolver against the stored
//! predecessor and successor.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, Params};

use cardchain_core::{resolve_previous, Card, CardCrypto, CardId, RawSignedModel};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{CardStore, InsertResult};

/// SQLite-backed card cache.
///
/// Thread-safe via internal Mutex.
pub struct SqliteCardStore<C: CardCrypto> {
    crypto: C,
    conn: Mutex<Connection>,
}

impl<C: CardCrypto> SqliteCardStore<C> {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>, crypto: C) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            crypto,
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory(crypto: C) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            crypto,
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        f(&conn)
    }

    fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        f(&mut conn)
    }

    fn parse_stored(&self, raw_json: &str) -> Result<Card<C::PublicKey>> {
        let raw = RawSignedModel::import_from_json(raw_json)?;
        Ok(Card::try_parse(&self.crypto, &raw)?)
    }

    fn load_unlinked(&self, conn: &Connection, id: &CardId) -> Result<Option<Card<C::PublicKey>>> {
        let json: Option<String> = conn
            .query_row(
                "SELECT raw_json FROM cards WHERE identifier = ?1",
                params![id.as_bytes().as_slice()],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|j| self.parse_stored(&j)).transpose()
    }

    /// Load a card and rebuild its chain state.
    fn load(&self, conn: &Connection, id: &CardId) -> Result<Option<Card<C::PublicKey>>> {
        let Some(mut card) = self.load_unlinked(conn, id)? else {
            return Ok(None);
        };

        if let Some(previous_id) = card.previous_card_id().copied() {
            if let Some(previous) = self.load_unlinked(conn, &previous_id)? {
                let mut lookup = [previous];
                resolve_previous(&mut card, &mut lookup[..]);
            }
        }

        let successor: Option<String> = conn
            .query_row(
                "SELECT raw_json FROM cards WHERE previous_card_id = ?1 LIMIT 1",
                params![id.as_bytes().as_slice()],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(json) = successor {
            let mut successor = self.parse_stored(&json)?;
            resolve_previous(&mut successor, std::slice::from_mut(&mut card));
        }

        Ok(Some(card))
    }

    fn load_all(&self, conn: &Connection, ids: &[CardId]) -> Result<Vec<Card<C::PublicKey>>> {
        let mut cards = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(card) = self.load(conn, id)? {
                cards.push(card);
            }
        }
        Ok(cards)
    }
}

fn id_from_blob(bytes: &[u8]) -> Result<CardId> {
    CardId::try_from(bytes)
        .map_err(|_| StoreError::InvalidData(format!("card id has {} bytes", bytes.len())))
}

fn query_ids<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<CardId>> {
    let mut stmt = conn.prepare(sql)?;
    let blobs = stmt
        .query_map(params, |row| row.get::<_, Vec<u8>>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    blobs.iter().map(|b| id_from_blob(b)).collect()
}

impl<C: CardCrypto> CardStore<C::PublicKey> for SqliteCardStore<C> {
    fn insert(&self, card: Card<C::PublicKey>) -> Result<InsertResult> {
        let raw_json = card.raw_model()?.export_as_json()?;
        let id = *card.identifier();
        let previous = card.previous_card_id().copied();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let is_outdated: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM cards WHERE previous_card_id = ?1)",
                params![id.as_bytes().as_slice()],
                |row| row.get(0),
            )?;

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO cards (
                    identifier, identity, previous_card_id, created_at,
                    is_outdated, raw_json, inserted_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.as_bytes().as_slice(),
                    card.identity(),
                    previous.as_ref().map(|p| p.as_bytes().to_vec()),
                    card.created_at().timestamp(),
                    is_outdated,
                    raw_json,
                    chrono::Utc::now().timestamp_millis(),
                ],
            )?;

            if inserted == 0 {
                return Ok(InsertResult::AlreadyExists);
            }

            if let Some(previous) = previous.filter(|p| *p != id) {
                tx.execute(
                    "UPDATE cards SET is_outdated = 1 WHERE identifier = ?1",
                    params![previous.as_bytes().as_slice()],
                )?;
            }

            tx.commit()?;
            tracing::debug!(card_id = %id, identity = card.identity(), "Stored card");
            Ok(InsertResult::Inserted)
        })
    }

    fn get(&self, id: &CardId) -> Result<Option<Card<C::PublicKey>>> {
        self.with_conn(|conn| self.load(conn, id))
    }

    fn has(&self, id: &CardId) -> Result<bool> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM cards WHERE identifier = ?1)",
                params![id.as_bytes().as_slice()],
                |row| row.get(0),
            )?)
        })
    }

    fn by_identity(&self, identity: &str) -> Result<Vec<Card<C::PublicKey>>> {
        self.with_conn(|conn| {
            let ids = query_ids(
                conn,
                "SELECT identifier FROM cards WHERE identity = ?1 ORDER BY created_at, identifier",
                params![identity],
            )?;
            self.load_all(conn, &ids)
        })
    }

    fn current_by_identity(&self, identity: &str) -> Result<Vec<Card<C::PublicKey>>> {
        self.with_conn(|conn| {
            let ids = query_ids(
                conn,
                "SELECT identifier FROM cards WHERE identity = ?1 AND is_outdated = 0
                 ORDER BY created_at, identifier",
                params![identity],
            )?;
            self.load_all(conn, &ids)
        })
    }

    fn successors_of(&self, id: &CardId) -> Result<Vec<CardId>> {
        self.with_conn(|conn| {
            query_ids(
                conn,
                "SELECT identifier FROM cards WHERE previous_card_id = ?1 ORDER BY identifier",
                params![id.as_bytes().as_slice()],
            )
        })
    }

    fn all_ids(&self) -> Result<Vec<CardId>> {
        self.with_conn(|conn| {
            query_ids(conn, "SELECT identifier FROM cards ORDER BY identifier", [])
        })
    }

    fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
            Ok(n as usize)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardchain_core::{encode_content, CardContent, Ed25519CardCrypto, Keypair, RawSignature};

    fn raw(seed: u8, previous: Option<&CardId>) -> RawSignedModel {
        let key = Keypair::from_seed(&[seed; 32]).public_key();
        let mut content = CardContent::new("alice", key.as_bytes(), 1_600_000_000 + seed as i64);
        if let Some(p) = previous {
            content = content.with_previous(p);
        }
        let mut raw = RawSignedModel::new(encode_content(&content).unwrap());
        raw.add_signature(RawSignature::new("self", vec![seed; 64], None))
            .unwrap();
        raw
    }

    fn parse(raw: &RawSignedModel) -> Card<cardchain_core::Ed25519PublicKey> {
        Card::parse(&Ed25519CardCrypto, raw).unwrap()
    }

    #[test]
    fn test_insert_get_roundtrip() {
        let store = SqliteCardStore::open_memory(Ed25519CardCrypto).unwrap();
        let original = raw(1, None);
        let card = parse(&original);
        let id = *card.identifier();

        assert_eq!(store.insert(card.clone()).unwrap(), InsertResult::Inserted);
        assert_eq!(store.insert(card).unwrap(), InsertResult::AlreadyExists);
        assert_eq!(store.count().unwrap(), 1);

        let loaded = store.get(&id).unwrap().unwrap();
        assert_eq!(loaded.raw_model().unwrap(), original);
        assert!(store.has(&id).unwrap());
        assert!(store.get(&CardId::from_bytes([0; 32])).unwrap().is_none());
    }

    #[test]
    fn test_chain_state_restored_on_load() {
        let store = SqliteCardStore::open_memory(Ed25519CardCrypto).unwrap();
        let a = parse(&raw(1, None));
        let b = parse(&raw(2, Some(a.identifier())));
        let (a_id, b_id) = (*a.identifier(), *b.identifier());

        // Successor first: the predecessor must still come back outdated.
        store.insert(b).unwrap();
        store.insert(a).unwrap();

        let a = store.get(&a_id).unwrap().unwrap();
        let b = store.get(&b_id).unwrap().unwrap();
        assert!(a.is_outdated());
        assert!(!b.is_outdated());
        assert_eq!(b.previous_card(), Some(&a_id));

        let current = store.current_by_identity("alice").unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].identifier(), &b_id);
        assert_eq!(store.successors_of(&a_id).unwrap(), vec![b_id]);
    }
}
