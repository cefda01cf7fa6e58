//! In-memory collaborators with failure injection and completion gates.
//!
//! A gate holds a call until the test releases it, which lets a test decide
//! the order in which concurrent calls complete.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use food_notes::api::{NotePage, NotesApi};
use food_notes::models::*;
use food_notes::storage::BlobStore;
use food_notes::{ClientError, NoteListController};
use parking_lot::Mutex;
use tokio::sync::oneshot;

pub type TestController = NoteListController<Arc<FakeApi>, Arc<FakeStorage>>;

pub fn setup() -> (TestController, Arc<FakeApi>, Arc<FakeStorage>) {
    let api = Arc::new(FakeApi::new());
    let storage = Arc::new(FakeStorage::new());
    let controller = NoteListController::new(api.clone(), storage.clone());
    (controller, api, storage)
}

pub fn form(name: &str, price: &str) -> NoteForm {
    NoteForm {
        name: name.to_string(),
        description: format!("{} description", name),
        price: price.to_string(),
        image: None,
    }
}

/// Queue of gates; each call takes the next one, in call order.
#[derive(Default)]
struct Gates {
    pending: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl Gates {
    fn add(&self, count: usize) -> Vec<oneshot::Sender<()>> {
        let mut pending = self.pending.lock();
        (0..count)
            .map(|_| {
                let (tx, rx) = oneshot::channel();
                pending.push_back(rx);
                tx
            })
            .collect()
    }

    async fn pass(&self) {
        let gate = self.pending.lock().pop_front();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
    }
}

// ============================================================
// API
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOp {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    List(Option<String>),
    Create(CreateNoteInput),
    Update(UpdateNoteInput),
    Delete(NoteId),
}

#[derive(Default)]
pub struct FakeApi {
    notes: Mutex<Vec<Note>>,
    next_id: Mutex<u64>,
    page_size: Mutex<Option<usize>>,
    stuck_token: Mutex<Option<String>>,
    failing: Mutex<HashSet<ApiOp>>,
    calls: Mutex<Vec<ApiCall>>,
    applied_updates: Mutex<Vec<UpdateNoteInput>>,
    list_gates: Gates,
    update_gates: Gates,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record directly, as if another client had created it.
    pub fn seed(&self, name: &str, price: f64, image: Option<&str>) -> Note {
        let note = Note {
            id: self.next_id(),
            name: name.to_string(),
            description: format!("{} description", name),
            price,
            image_key: image.map(str::to_string),
            image_url: None,
            created_at: None,
            updated_at: None,
        };
        self.notes.lock().push(note.clone());
        note
    }

    fn next_id(&self) -> NoteId {
        let mut next = self.next_id.lock();
        *next += 1;
        NoteId::new(format!("note-{}", *next))
    }

    pub fn stored(&self) -> Vec<Note> {
        self.notes.lock().clone()
    }

    pub fn stored_note(&self, id: &NoteId) -> Option<Note> {
        self.notes.lock().iter().find(|n| &n.id == id).cloned()
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, op: ApiOp) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| {
                matches!(
                    (call, op),
                    (ApiCall::List(_), ApiOp::List)
                        | (ApiCall::Create(_), ApiOp::Create)
                        | (ApiCall::Update(_), ApiOp::Update)
                        | (ApiCall::Delete(_), ApiOp::Delete)
                )
            })
            .count()
    }

    pub fn applied_updates(&self) -> Vec<UpdateNoteInput> {
        self.applied_updates.lock().clone()
    }

    pub fn set_page_size(&self, size: usize) {
        *self.page_size.lock() = Some(size);
    }

    /// Make every page hand out `token` as its `nextToken`.
    pub fn stick_next_token(&self, token: &str) {
        *self.stuck_token.lock() = Some(token.to_string());
    }

    pub fn fail(&self, op: ApiOp) {
        self.failing.lock().insert(op);
    }

    pub fn recover(&self, op: ApiOp) {
        self.failing.lock().remove(&op);
    }

    /// Hold the next `count` list calls. Each call snapshots the records
    /// when it is made and returns that snapshot once released.
    pub fn gate_lists(&self, count: usize) -> Vec<oneshot::Sender<()>> {
        self.list_gates.add(count)
    }

    /// Hold the next `count` update calls. Each update is applied when
    /// released.
    pub fn gate_updates(&self, count: usize) -> Vec<oneshot::Sender<()>> {
        self.update_gates.add(count)
    }

    fn check(&self, op: ApiOp) -> Result<(), ClientError> {
        if self.failing.lock().contains(&op) {
            Err(ClientError::Server(format!("{:?} failed", op)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NotesApi for FakeApi {
    async fn list_notes(&self, next_token: Option<&str>) -> Result<NotePage, ClientError> {
        self.calls
            .lock()
            .push(ApiCall::List(next_token.map(str::to_string)));
        self.check(ApiOp::List)?;

        let offset: usize = next_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let page_size = self.page_size.lock().unwrap_or(usize::MAX);
        let page = {
            let notes = self.notes.lock();
            let items: Vec<Note> = notes.iter().skip(offset).take(page_size).cloned().collect();
            let end = offset + items.len();
            let next_token = match self.stuck_token.lock().clone() {
                Some(token) => Some(token),
                None => (end < notes.len()).then(|| end.to_string()),
            };
            NotePage { items, next_token }
        };

        self.list_gates.pass().await;
        Ok(page)
    }

    async fn create_note(&self, input: &CreateNoteInput) -> Result<Note, ClientError> {
        self.calls.lock().push(ApiCall::Create(input.clone()));
        self.check(ApiOp::Create)?;

        let note = Note {
            id: self.next_id(),
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            image_key: input.image.clone(),
            image_url: None,
            created_at: None,
            updated_at: None,
        };
        self.notes.lock().push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, input: &UpdateNoteInput) -> Result<Note, ClientError> {
        self.calls.lock().push(ApiCall::Update(input.clone()));
        self.update_gates.pass().await;
        self.check(ApiOp::Update)?;

        let mut notes = self.notes.lock();
        let note = notes
            .iter_mut()
            .find(|n| n.id == input.id)
            .ok_or_else(|| ClientError::NotFound(input.id.to_string()))?;
        note.name = input.name.clone();
        note.description = input.description.clone();
        note.price = input.price;
        self.applied_updates.lock().push(input.clone());
        Ok(note.clone())
    }

    async fn delete_note(&self, input: &DeleteNoteInput) -> Result<Note, ClientError> {
        self.calls.lock().push(ApiCall::Delete(input.id.clone()));
        self.check(ApiOp::Delete)?;

        let mut notes = self.notes.lock();
        let pos = notes
            .iter()
            .position(|n| n.id == input.id)
            .ok_or_else(|| ClientError::NotFound(input.id.to_string()))?;
        Ok(notes.remove(pos))
    }
}

// ============================================================
// Storage
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Put(String),
    GetUrl(String),
    Remove(String),
}

#[derive(Default)]
pub struct FakeStorage {
    blobs: Mutex<std::collections::HashMap<String, Vec<u8>>>,
    failing_keys: Mutex<HashSet<String>>,
    calls: Mutex<Vec<StorageCall>>,
    remove_gates: Gates,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The display URL this store hands out for `key`.
    pub fn url_for(key: &str) -> String {
        format!("https://cdn.test/{}?sig=1", key)
    }

    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, bytes: Vec<u8>) {
        self.blobs.lock().insert(key.to_string(), bytes);
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().clone()
    }

    /// Make every call touching `key` fail.
    pub fn fail_key(&self, key: &str) {
        self.failing_keys.lock().insert(key.to_string());
    }

    pub fn gate_removes(&self, count: usize) -> Vec<oneshot::Sender<()>> {
        self.remove_gates.add(count)
    }

    fn check(&self, key: &str) -> Result<(), ClientError> {
        if self.failing_keys.lock().contains(key) {
            Err(ClientError::Server(format!("storage failure for {}", key)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BlobStore for FakeStorage {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), ClientError> {
        self.calls.lock().push(StorageCall::Put(key.to_string()));
        self.check(key)?;
        self.blobs.lock().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get_url(&self, key: &str) -> Result<String, ClientError> {
        self.calls.lock().push(StorageCall::GetUrl(key.to_string()));
        self.check(key)?;
        Ok(Self::url_for(key))
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.calls.lock().push(StorageCall::Remove(key.to_string()));
        self.remove_gates.pass().await;
        self.check(key)?;
        self.blobs.lock().remove(key);
        Ok(())
    }
}
