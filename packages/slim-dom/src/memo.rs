//! # Identity-keyed memoization
//!
//! [`Memo`] caches the result of a pure function of one or more arguments.
//!
//! ## Keys
//!
//! Every compound argument (anything held in an [`Arc`]) is identified by an
//! [`ObjectTag`] interned in a side table keyed by allocation address. The
//! table keeps a `Weak` handle to each tagged allocation, so an address can
//! never be recycled while its tag is live. Scalar arguments contribute their
//! value. The key is the position-ordered list of parts, so `(a, b)` and
//! `(b, a)` never collide.
//!
//! ## Anchors
//!
//! Results are filed in a bucket owned by the first compound argument (the
//! anchor). Buckets whose anchor has been dropped are reclaimed wholesale by
//! a sweep that runs whenever the tag table doubles past
//! [`MemoConfig::sweep_threshold`]. Calls with no compound argument share a
//! default bucket that is discarded once it is older than
//! [`MemoConfig::default_anchor_ttl`].
//!
//! ## Threading
//!
//! A `Memo` is not `Sync`; declare it in a `thread_local!`. The compute
//! closure runs with no borrow held, so memoized functions may call
//! themselves recursively.
//!
//! Cached values must never hold a strong reference to their own anchor, or
//! the anchor can never be observed as dropped.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::debug;

type Erased = Arc<dyn Any + Send + Sync>;
type WeakErased = Weak<dyn Any + Send + Sync>;

/// Memo cache tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoConfig {
    /// Lifetime of the default (anchorless) bucket in milliseconds
    #[serde(default = "default_anchor_ttl_ms")]
    pub default_anchor_ttl_ms: u64,

    /// Minimum number of tagged objects before dead anchors are swept
    #[serde(default = "default_sweep_threshold")]
    pub sweep_threshold: usize,
}

fn default_anchor_ttl_ms() -> u64 {
    5 * 60 * 1000
}

fn default_sweep_threshold() -> usize {
    64
}

impl MemoConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn default_anchor_ttl(&self) -> Duration {
        Duration::from_millis(self.default_anchor_ttl_ms)
    }
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            default_anchor_ttl_ms: default_anchor_ttl_ms(),
            sweep_threshold: default_sweep_threshold(),
        }
    }
}

/// Interned identity of one live allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectTag(u64);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Str(String),
}

/// One argument as seen by the cache
pub enum MemoArg {
    Object(Erased),
    Scalar(Scalar),
}

pub trait MemoArgument {
    fn to_memo_arg(&self) -> MemoArg;
}

impl<T: Any + Send + Sync> MemoArgument for Arc<T> {
    fn to_memo_arg(&self) -> MemoArg {
        let erased: Erased = self.clone();
        MemoArg::Object(erased)
    }
}

impl MemoArgument for bool {
    fn to_memo_arg(&self) -> MemoArg {
        MemoArg::Scalar(Scalar::Bool(*self))
    }
}

impl MemoArgument for i64 {
    fn to_memo_arg(&self) -> MemoArg {
        MemoArg::Scalar(Scalar::Int(*self))
    }
}

impl MemoArgument for u64 {
    fn to_memo_arg(&self) -> MemoArg {
        MemoArg::Scalar(Scalar::UInt(*self))
    }
}

impl MemoArgument for usize {
    fn to_memo_arg(&self) -> MemoArg {
        MemoArg::Scalar(Scalar::UInt(*self as u64))
    }
}

impl MemoArgument for String {
    fn to_memo_arg(&self) -> MemoArg {
        MemoArg::Scalar(Scalar::Str(self.clone()))
    }
}

/// Argument tuple of a memoized function
pub trait MemoArgs {
    fn memo_args(&self) -> Vec<MemoArg>;
}

macro_rules! impl_memo_args {
    ($($name:ident),+) => {
        impl<$($name: MemoArgument),+> MemoArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn memo_args(&self) -> Vec<MemoArg> {
                let ($($name,)+) = self;
                vec![$($name.to_memo_arg()),+]
            }
        }
    };
}

impl_memo_args!(A);
impl_memo_args!(A, B);
impl_memo_args!(A, B, C);
impl_memo_args!(A, B, C, D);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Object(ObjectTag),
    Scalar(Scalar),
}

type Key = Vec<KeyPart>;

struct TagEntry {
    object: WeakErased,
    tag: ObjectTag,
}

struct Bucket<V> {
    anchor: WeakErased,
    entries: HashMap<Key, V>,
}

struct MemoState<V> {
    config: MemoConfig,
    next_tag: u64,
    tags: HashMap<usize, TagEntry>,
    anchors: HashMap<ObjectTag, Bucket<V>>,
    default_bucket: HashMap<Key, V>,
    default_created: Instant,
    sweep_at: usize,
}

/// Snapshot of a cache's bookkeeping, for diagnostics and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoStats {
    pub tags: usize,
    pub anchors: usize,
    pub anchored_entries: usize,
    pub default_entries: usize,
}

/// Cache for a pure function whose arguments are the tuple `A`
pub struct Memo<A, V> {
    name: &'static str,
    state: RefCell<MemoState<V>>,
    _args: PhantomData<fn(&A)>,
}

fn address(object: &Erased) -> usize {
    Arc::as_ptr(object) as *const () as usize
}

impl<V> MemoState<V> {
    fn new(config: MemoConfig) -> Self {
        let sweep_at = config.sweep_threshold;
        Self {
            config,
            next_tag: 0,
            tags: HashMap::new(),
            anchors: HashMap::new(),
            default_bucket: HashMap::new(),
            default_created: Instant::now(),
            sweep_at,
        }
    }

    fn tag(&mut self, name: &'static str, object: &Erased) -> ObjectTag {
        let addr = address(object);
        if let Some(entry) = self.tags.get(&addr) {
            return entry.tag;
        }

        if self.tags.len() >= self.sweep_at {
            self.sweep(name);
        }

        self.next_tag += 1;
        let tag = ObjectTag(self.next_tag);
        self.tags.insert(
            addr,
            TagEntry {
                object: Arc::downgrade(object),
                tag,
            },
        );
        tag
    }

    fn key(
        &mut self,
        name: &'static str,
        args: &[MemoArg],
    ) -> (Option<(ObjectTag, WeakErased)>, Key) {
        let mut anchor = None;
        let mut key = Vec::with_capacity(args.len());

        for arg in args {
            match arg {
                MemoArg::Object(object) => {
                    let tag = self.tag(name, object);
                    if anchor.is_none() {
                        anchor = Some((tag, Arc::downgrade(object)));
                    }
                    key.push(KeyPart::Object(tag));
                }
                MemoArg::Scalar(scalar) => key.push(KeyPart::Scalar(scalar.clone())),
            }
        }

        (anchor, key)
    }

    fn expire_default_bucket(&mut self, name: &'static str) {
        let now = Instant::now();
        if now.duration_since(self.default_created) >= self.config.default_anchor_ttl() {
            if !self.default_bucket.is_empty() {
                debug!(
                    memo = name,
                    entries = self.default_bucket.len(),
                    "Discarding default memo bucket"
                );
            }
            self.default_bucket = HashMap::new();
            self.default_created = now;
        }
    }

    fn sweep(&mut self, name: &'static str) {
        let tags_before = self.tags.len();
        let anchors_before = self.anchors.len();

        self.anchors.retain(|_, bucket| bucket.anchor.strong_count() > 0);
        self.tags.retain(|_, entry| entry.object.strong_count() > 0);
        self.sweep_at = self.config.sweep_threshold.max(self.tags.len() * 2);

        debug!(
            memo = name,
            tags_dropped = tags_before - self.tags.len(),
            anchors_dropped = anchors_before - self.anchors.len(),
            "Swept dead memo anchors"
        );
    }
}

impl<A: MemoArgs, V: Clone> Memo<A, V> {
    pub fn new(name: &'static str) -> Self {
        Self::with_config(name, MemoConfig::default())
    }

    pub fn with_config(name: &'static str, config: MemoConfig) -> Self {
        Self {
            name,
            state: RefCell::new(MemoState::new(config)),
            _args: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn set_config(&self, config: MemoConfig) {
        let mut state = self.state.borrow_mut();
        state.sweep_at = config.sweep_threshold.max(state.tags.len() * 2);
        state.config = config;
    }

    /// Returns the cached result for `args`, computing and filing it first
    /// if this is the first call with identity-equal arguments.
    pub fn get_or_insert_with(&self, args: &A, compute: impl FnOnce() -> V) -> V {
        let args = args.memo_args();

        let (anchor, key) = {
            let mut state = self.state.borrow_mut();
            state.expire_default_bucket(self.name);
            let (anchor, key) = state.key(self.name, &args);

            let cached = match &anchor {
                Some((tag, _)) => state
                    .anchors
                    .get(tag)
                    .and_then(|bucket| bucket.entries.get(&key)),
                None => state.default_bucket.get(&key),
            };
            if let Some(value) = cached {
                return value.clone();
            }
            (anchor, key)
        };

        let value = compute();

        let mut state = self.state.borrow_mut();
        match anchor {
            Some((tag, weak)) => {
                state
                    .anchors
                    .entry(tag)
                    .or_insert_with(|| Bucket {
                        anchor: weak,
                        entries: HashMap::new(),
                    })
                    .entries
                    .insert(key, value.clone());
            }
            None => {
                state.default_bucket.insert(key, value.clone());
            }
        }

        value
    }

    /// Drops buckets and tags whose objects are gone
    pub fn sweep(&self) {
        self.state.borrow_mut().sweep(self.name);
    }

    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        let config = state.config.clone();
        *state = MemoState::new(config);
    }

    pub fn stats(&self) -> MemoStats {
        let state = self.state.borrow();
        MemoStats {
            tags: state.tags.len(),
            anchors: state.anchors.len(),
            anchored_entries: state.anchors.values().map(|b| b.entries.len()).sum(),
            default_entries: state.default_bucket.len(),
        }
    }
}
