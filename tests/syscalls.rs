//! End-to-end scenarios driving the full syscall surface through a
//! test VM seam.

use std::sync::Arc;

use neo_interop::crypto;
use neo_interop::ledger::{
    Block, ContractState, Header, ScriptContainer, Transaction, TransactionType, Witness,
};
use neo_interop::{
    method_id, Disposable, EvaluationStack, Fixed8, GasMeter, InteropError, InteropHandle,
    MemorySnapshot, MemoryStore, ScriptEngine, ServiceSession, SharedStore, StackValue,
    StorageFlags, TriggerType, UInt160, UInt256, ValueMap,
};

struct TestEngine {
    stack: EvaluationStack,
    current: UInt160,
    calling: Option<UInt160>,
    entry: UInt160,
    container: Option<Arc<ScriptContainer>>,
}

impl TestEngine {
    fn new(current: UInt160) -> Self {
        Self {
            stack: EvaluationStack::new(),
            current,
            calling: None,
            entry: current,
            container: None,
        }
    }

    fn with_container(mut self, container: ScriptContainer) -> Self {
        self.container = Some(Arc::new(container));
        self
    }
}

impl ScriptEngine for TestEngine {
    fn evaluation_stack(&self) -> &EvaluationStack {
        &self.stack
    }

    fn evaluation_stack_mut(&mut self) -> &mut EvaluationStack {
        &mut self.stack
    }

    fn current_script_hash(&self) -> UInt160 {
        self.current
    }

    fn calling_script_hash(&self) -> Option<UInt160> {
        self.calling
    }

    fn entry_script_hash(&self) -> UInt160 {
        self.entry
    }

    fn script_container(&self) -> Option<Arc<ScriptContainer>> {
        self.container.clone()
    }
}

fn script_hash(byte: u8) -> UInt160 {
    UInt160::from_le_bytes([byte; 20])
}

fn session_over(store: &SharedStore, trigger: TriggerType) -> ServiceSession {
    ServiceSession::new(trigger, Box::new(MemorySnapshot::new(Arc::clone(store))))
}

/// Invokes by name, expecting the method to exist and the handler to
/// succeed.
fn invoke(session: &mut ServiceSession, engine: &mut TestEngine, method: &str) {
    let mut meter = GasMeter::unlimited();
    let found = session
        .invoke(engine, method.as_bytes(), &mut meter)
        .unwrap_or_else(|err| panic!("{method} failed: {err}"));
    assert!(found, "{method} not registered");
}

fn invoke_err(session: &mut ServiceSession, engine: &mut TestEngine, method: &str) -> InteropError {
    let mut meter = GasMeter::unlimited();
    match session.invoke(engine, method.as_bytes(), &mut meter) {
        Err(err) => err,
        Ok(outcome) => panic!("{method} unexpectedly returned {outcome}"),
    }
}

/// Deploys a contract into the session's snapshot and returns its
/// script hash.
fn deploy(session: &mut ServiceSession, script: &[u8], has_storage: bool) -> UInt160 {
    let contract = ContractState::new(script.to_vec(), has_storage);
    let hash = contract.script_hash();
    session.snapshot_mut().put_contract(contract);
    hash
}

#[test]
fn serialize_deserialize_round_trip_via_syscalls() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(1));

    engine.stack.push(StackValue::from_bytes(b"hello".to_vec()));
    invoke(&mut session, &mut engine, "System.Runtime.Serialize");
    let bytes = engine.stack.pop().unwrap().to_bytes().unwrap();
    assert_eq!(bytes, vec![0x00, 0x05, b'h', b'e', b'l', b'l', b'o']);

    engine.stack.push(StackValue::from_bytes(bytes));
    invoke(&mut session, &mut engine, "System.Runtime.Deserialize");
    let value = engine.stack.pop().unwrap();
    assert_eq!(value, StackValue::from_bytes(b"hello".to_vec()));
}

#[test]
fn map_round_trip_preserves_key_order() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(1));

    let map = ValueMap::new();
    map.insert(StackValue::from_bytes(b"k1".to_vec()), StackValue::from_int(1))
        .unwrap();
    map.insert(StackValue::from_bytes(b"k2".to_vec()), StackValue::from_int(2))
        .unwrap();
    engine.stack.push(StackValue::Map(map));

    invoke(&mut session, &mut engine, "System.Runtime.Serialize");
    invoke(&mut session, &mut engine, "System.Runtime.Deserialize");

    let StackValue::Map(decoded) = engine.stack.pop().unwrap() else {
        panic!("expected a map");
    };
    let keys: Vec<Vec<u8>> = decoded
        .entries()
        .into_iter()
        .map(|(k, _)| k.to_bytes().unwrap())
        .collect();
    assert_eq!(keys, vec![b"k1".to_vec(), b"k2".to_vec()]);
}

#[test]
fn cyclic_value_fails_serialization() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(1));

    let list = neo_interop::ValueList::new(Vec::new());
    list.push(StackValue::Array(list.clone()));
    engine.stack.push(StackValue::Array(list));

    let err = invoke_err(&mut session, &mut engine, "System.Runtime.Serialize");
    assert!(matches!(err, InteropError::NotSupported { .. }));
}

#[test]
fn storage_put_commit_survives_into_new_session() {
    let store = MemoryStore::shared();

    let contract_hash = {
        let mut session = session_over(&store, TriggerType::Application);
        let contract_hash = deploy(&mut session, b"contract-x", true);
        let mut engine = TestEngine::new(contract_hash);

        engine.stack.push(StackValue::from_bytes(b"v".to_vec()));
        engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
        invoke(&mut session, &mut engine, "System.Storage.GetContext");
        invoke(&mut session, &mut engine, "System.Storage.Put");
        session.commit().unwrap();
        contract_hash
    };

    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(contract_hash);
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    invoke(&mut session, &mut engine, "System.Storage.Get");
    let value = engine.stack.pop().unwrap().to_bytes().unwrap();
    assert_eq!(value, b"v".to_vec());
}

#[test]
fn read_only_context_rejects_put() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let contract_hash = deploy(&mut session, b"contract-x", true);
    let mut engine = TestEngine::new(contract_hash);

    engine.stack.push(StackValue::from_bytes(b"v".to_vec()));
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetReadOnlyContext");
    let err = invoke_err(&mut session, &mut engine, "System.Storage.Put");
    assert_eq!(err, InteropError::ReadOnlyContext);
}

#[test]
fn as_read_only_demotes_a_writable_context() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let contract_hash = deploy(&mut session, b"contract-x", true);
    let mut engine = TestEngine::new(contract_hash);

    engine.stack.push(StackValue::from_bytes(b"v".to_vec()));
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    invoke(&mut session, &mut engine, "System.StorageContext.AsReadOnly");
    let err = invoke_err(&mut session, &mut engine, "System.Storage.Put");
    assert_eq!(err, InteropError::ReadOnlyContext);
}

#[test]
fn storage_key_length_boundary() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let contract_hash = deploy(&mut session, b"contract-x", true);
    let mut engine = TestEngine::new(contract_hash);

    engine.stack.push(StackValue::from_bytes(b"v".to_vec()));
    engine.stack.push(StackValue::from_bytes(vec![0xAB; 1024]));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    invoke(&mut session, &mut engine, "System.Storage.Put");

    engine.stack.push(StackValue::from_bytes(b"v".to_vec()));
    engine.stack.push(StackValue::from_bytes(vec![0xAB; 1025]));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    let err = invoke_err(&mut session, &mut engine, "System.Storage.Put");
    assert!(matches!(err, InteropError::KeyTooLong { len: 1025, .. }));
}

#[test]
fn constant_entries_refuse_rewrites_and_deletes() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let contract_hash = deploy(&mut session, b"contract-x", true);
    let mut engine = TestEngine::new(contract_hash);

    // PutEx pops context, key, value, flags.
    engine
        .stack
        .push(StackValue::from_int(StorageFlags::CONSTANT.bits()));
    engine.stack.push(StackValue::from_bytes(b"v".to_vec()));
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    invoke(&mut session, &mut engine, "System.Storage.PutEx");

    engine.stack.push(StackValue::from_bytes(b"v2".to_vec()));
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    let err = invoke_err(&mut session, &mut engine, "System.Storage.Put");
    assert!(matches!(err, InteropError::StorageViolation { .. }));

    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    let err = invoke_err(&mut session, &mut engine, "System.Storage.Delete");
    assert!(matches!(err, InteropError::StorageViolation { .. }));

    // The original value is still observable.
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    invoke(&mut session, &mut engine, "System.Storage.Get");
    assert_eq!(
        engine.stack.pop().unwrap().to_bytes().unwrap(),
        b"v".to_vec()
    );
}

#[test]
fn delete_then_get_observes_empty_bytes() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let contract_hash = deploy(&mut session, b"contract-x", true);
    let mut engine = TestEngine::new(contract_hash);

    engine.stack.push(StackValue::from_bytes(b"v".to_vec()));
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    invoke(&mut session, &mut engine, "System.Storage.Put");

    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    invoke(&mut session, &mut engine, "System.Storage.Delete");

    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    invoke(&mut session, &mut engine, "System.Storage.Get");
    assert!(engine.stack.pop().unwrap().to_bytes().unwrap().is_empty());
}

#[test]
fn partitions_are_isolated_between_scripts() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let a = deploy(&mut session, b"contract-a", true);
    let b = deploy(&mut session, b"contract-b", true);

    // B writes into its own partition.
    let mut engine_b = TestEngine::new(b);
    engine_b.stack.push(StackValue::from_bytes(b"b-value".to_vec()));
    engine_b.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine_b, "System.Storage.GetContext");
    invoke(&mut session, &mut engine_b, "System.Storage.Put");

    // A's own-context get sees only A's (empty) partition.
    let mut engine_a = TestEngine::new(a);
    engine_a.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine_a, "System.Storage.GetContext");
    invoke(&mut session, &mut engine_a, "System.Storage.Get");
    assert!(engine_a.stack.pop().unwrap().to_bytes().unwrap().is_empty());

    // A reading through a read-only view of B's partition sees B's
    // data, but cannot write without creator provenance.
    engine_a.stack.push(StackValue::from_bytes(b"k".to_vec()));
    engine_a
        .stack
        .push(StackValue::InteropHandle(InteropHandle::StorageContext(
            neo_interop::StorageContext::new(b).as_read_only(),
        )));
    invoke(&mut session, &mut engine_a, "System.Storage.Get");
    assert_eq!(
        engine_a.stack.pop().unwrap().to_bytes().unwrap(),
        b"b-value".to_vec()
    );
}

#[test]
fn storage_context_is_granted_only_to_the_creator() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let a = script_hash(0xA1);
    let b = script_hash(0xB2);
    let c = deploy(&mut session, b"contract-c", true);
    session.note_contract_created(c, a);

    let contract = Arc::new(ContractState::new(b"contract-c".to_vec(), true));

    // The creator obtains a writable context and its writes land in
    // C's partition.
    let mut engine_a = TestEngine::new(a);
    engine_a.stack.push(StackValue::from_bytes(b"v".to_vec()));
    engine_a.stack.push(StackValue::from_bytes(b"k".to_vec()));
    engine_a
        .stack
        .push(StackValue::InteropHandle(InteropHandle::Contract(Arc::clone(&contract))));
    invoke(&mut session, &mut engine_a, "System.Contract.GetStorageContext");
    invoke(&mut session, &mut engine_a, "System.Storage.Put");

    let mut engine_c = TestEngine::new(c);
    engine_c.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine_c, "System.Storage.GetContext");
    invoke(&mut session, &mut engine_c, "System.Storage.Get");
    assert_eq!(
        engine_c.stack.pop().unwrap().to_bytes().unwrap(),
        b"v".to_vec()
    );

    // An unrelated script is refused.
    let mut engine_b = TestEngine::new(b);
    engine_b
        .stack
        .push(StackValue::InteropHandle(InteropHandle::Contract(contract)));
    let err = invoke_err(&mut session, &mut engine_b, "System.Contract.GetStorageContext");
    assert!(matches!(err, InteropError::NotAuthorized { .. }));
}

fn single_witness_transaction(verification_script: &[u8]) -> Transaction {
    let mut tx = Transaction::new(TransactionType::Invocation);
    tx.witnesses.push(Witness {
        invocation_script: Vec::new(),
        verification_script: verification_script.to_vec(),
    });
    tx
}

#[test]
fn check_witness_by_script_hash() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);

    let tx = single_witness_transaction(b"authorized-verifier");
    let witnessed = crypto::hash160(b"authorized-verifier");
    let mut engine = TestEngine::new(script_hash(1))
        .with_container(ScriptContainer::Transaction(Arc::new(tx)));

    engine.stack.push(StackValue::from_bytes(witnessed.to_vec()));
    invoke(&mut session, &mut engine, "System.Runtime.CheckWitness");
    assert!(engine.stack.pop().unwrap().to_bool());

    engine
        .stack
        .push(StackValue::from_bytes(script_hash(0xEE).to_vec()));
    invoke(&mut session, &mut engine, "System.Runtime.CheckWitness");
    assert!(!engine.stack.pop().unwrap().to_bool());

    // A 21-byte scalar observes false rather than faulting.
    engine.stack.push(StackValue::from_bytes(vec![0u8; 21]));
    invoke(&mut session, &mut engine, "System.Runtime.CheckWitness");
    assert!(!engine.stack.pop().unwrap().to_bool());
}

#[test]
fn check_witness_by_public_key() {
    // Compressed generator point of secp256r1.
    let pubkey: [u8; 33] = [
        0x03, 0x6b, 0x17, 0xd1, 0xf2, 0xe1, 0x2c, 0x42, 0x47, 0xf8, 0xbc, 0xe6, 0xe5, 0x63, 0xa4,
        0x40, 0xf2, 0x77, 0x03, 0x7d, 0x81, 0x2d, 0xeb, 0x33, 0xa0, 0xf4, 0xa1, 0x39, 0x45, 0xd8,
        0x98, 0xc2, 0x96,
    ];
    let redeem = crypto::single_signature_redeem_script(&pubkey);

    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let tx = single_witness_transaction(&redeem);
    let mut engine = TestEngine::new(script_hash(1))
        .with_container(ScriptContainer::Transaction(Arc::new(tx)));

    engine.stack.push(StackValue::from_bytes(pubkey.to_vec()));
    invoke(&mut session, &mut engine, "System.Runtime.CheckWitness");
    assert!(engine.stack.pop().unwrap().to_bool());

    // An off-curve encoding faults instead of answering.
    let mut bad = pubkey;
    bad[0] = 0x07;
    engine.stack.push(StackValue::from_bytes(bad.to_vec()));
    let err = invoke_err(&mut session, &mut engine, "System.Runtime.CheckWitness");
    assert!(matches!(err, InteropError::InvalidArgument { .. }));
}

#[test]
fn platform_and_trigger() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Verification);
    let mut engine = TestEngine::new(script_hash(1));

    invoke(&mut session, &mut engine, "System.Runtime.Platform");
    assert_eq!(
        engine.stack.pop().unwrap().to_bytes().unwrap(),
        b"NEO".to_vec()
    );

    invoke(&mut session, &mut engine, "System.Runtime.GetTrigger");
    assert_eq!(
        engine.stack.pop().unwrap().to_bigint().unwrap(),
        num_bigint::BigInt::from(0x00)
    );
}

#[test]
fn execution_engine_introspection() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(3));
    engine.calling = Some(script_hash(2));
    engine.entry = script_hash(1);

    invoke(&mut session, &mut engine, "System.ExecutionEngine.GetExecutingScriptHash");
    assert_eq!(
        engine.stack.pop().unwrap().to_bytes().unwrap(),
        script_hash(3).to_vec()
    );
    invoke(&mut session, &mut engine, "System.ExecutionEngine.GetCallingScriptHash");
    assert_eq!(
        engine.stack.pop().unwrap().to_bytes().unwrap(),
        script_hash(2).to_vec()
    );
    invoke(&mut session, &mut engine, "System.ExecutionEngine.GetEntryScriptHash");
    assert_eq!(
        engine.stack.pop().unwrap().to_bytes().unwrap(),
        script_hash(1).to_vec()
    );

    // Entry frames observe an empty calling hash.
    engine.calling = None;
    invoke(&mut session, &mut engine, "System.ExecutionEngine.GetCallingScriptHash");
    assert!(engine.stack.pop().unwrap().to_bytes().unwrap().is_empty());

    // The container round-trips through the handle.
    let tx = Arc::new(single_witness_transaction(b"w"));
    let mut engine = TestEngine::new(script_hash(3))
        .with_container(ScriptContainer::Transaction(Arc::clone(&tx)));
    invoke(&mut session, &mut engine, "System.ExecutionEngine.GetScriptContainer");
    invoke(&mut session, &mut engine, "System.Transaction.GetHash");
    assert_eq!(
        engine.stack.pop().unwrap().to_bytes().unwrap(),
        tx.hash().to_vec()
    );
}

fn chain_with_two_blocks(store: &SharedStore) -> (Arc<Block>, Arc<Block>) {
    let tx = Arc::new(single_witness_transaction(b"block-tx"));
    let genesis = Block::new(
        Header::new(0, UInt256::zero(), UInt256::zero(), 1_000, 0, 1, script_hash(0xCC)),
        Vec::new(),
    );
    let genesis_hash = genesis.hash();
    let next = Block::new(
        Header::new(0, genesis_hash, UInt256::zero(), 1_015, 1, 2, script_hash(0xCD)),
        vec![Arc::clone(&tx)],
    );
    let mut guard = store.write();
    guard.add_block(genesis.clone());
    guard.add_block(next.clone());
    drop(guard);
    (Arc::new(genesis), Arc::new(next))
}

#[test]
fn blockchain_queries_by_height_and_hash() {
    let store = MemoryStore::shared();
    let (_, next) = chain_with_two_blocks(&store);
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(1));

    invoke(&mut session, &mut engine, "System.Blockchain.GetHeight");
    assert_eq!(
        engine.stack.pop().unwrap().to_bigint().unwrap(),
        num_bigint::BigInt::from(1)
    );

    // Height form: one byte.
    engine.stack.push(StackValue::from_bytes(vec![0x01]));
    invoke(&mut session, &mut engine, "System.Blockchain.GetHeader");
    invoke(&mut session, &mut engine, "System.Header.GetIndex");
    assert_eq!(
        engine.stack.pop().unwrap().to_bigint().unwrap(),
        num_bigint::BigInt::from(1)
    );

    // Hash form: 32 bytes.
    engine
        .stack
        .push(StackValue::from_bytes(next.hash().to_vec()));
    invoke(&mut session, &mut engine, "System.Blockchain.GetBlock");
    invoke(&mut session, &mut engine, "System.Block.GetTransactionCount");
    assert_eq!(
        engine.stack.pop().unwrap().to_bigint().unwrap(),
        num_bigint::BigInt::from(1)
    );

    // Misses push the empty byte string.
    engine
        .stack
        .push(StackValue::from_bytes(UInt256::from_le_bytes([9u8; 32]).to_vec()));
    invoke(&mut session, &mut engine, "System.Blockchain.GetBlock");
    assert!(engine.stack.pop().unwrap().to_bytes().unwrap().is_empty());

    // Unknown height is also a miss.
    engine.stack.push(StackValue::from_bytes(vec![0x05]));
    invoke(&mut session, &mut engine, "System.Blockchain.GetHeader");
    assert!(engine.stack.pop().unwrap().to_bytes().unwrap().is_empty());

    // 6..31-byte scalars fault.
    engine.stack.push(StackValue::from_bytes(vec![0u8; 6]));
    let err = invoke_err(&mut session, &mut engine, "System.Blockchain.GetHeader");
    assert!(matches!(err, InteropError::InvalidArgument { .. }));
}

#[test]
fn transaction_lookups_and_heights() {
    let store = MemoryStore::shared();
    let (_, next) = chain_with_two_blocks(&store);
    let tx_hash = next.transactions[0].hash();
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(1));

    engine.stack.push(StackValue::from_bytes(tx_hash.to_vec()));
    invoke(&mut session, &mut engine, "System.Blockchain.GetTransaction");
    invoke(&mut session, &mut engine, "System.Transaction.GetHash");
    assert_eq!(
        engine.stack.pop().unwrap().to_bytes().unwrap(),
        tx_hash.to_vec()
    );

    engine.stack.push(StackValue::from_bytes(tx_hash.to_vec()));
    invoke(&mut session, &mut engine, "System.Blockchain.GetTransactionHeight");
    assert_eq!(
        engine.stack.pop().unwrap().to_bigint().unwrap(),
        num_bigint::BigInt::from(1)
    );

    let absent = UInt256::from_le_bytes([7u8; 32]);
    engine.stack.push(StackValue::from_bytes(absent.to_vec()));
    invoke(&mut session, &mut engine, "System.Blockchain.GetTransactionHeight");
    assert_eq!(
        engine.stack.pop().unwrap().to_bigint().unwrap(),
        num_bigint::BigInt::from(-1)
    );
}

#[test]
fn block_accessors_and_bounds() {
    let store = MemoryStore::shared();
    let (genesis, next) = chain_with_two_blocks(&store);
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(1));

    // Header accessors accept a block handle.
    engine
        .stack
        .push(StackValue::InteropHandle(InteropHandle::Block(Arc::clone(&next))));
    invoke(&mut session, &mut engine, "System.Header.GetPrevHash");
    assert_eq!(
        engine.stack.pop().unwrap().to_bytes().unwrap(),
        genesis.hash().to_vec()
    );

    engine
        .stack
        .push(StackValue::InteropHandle(InteropHandle::Block(Arc::clone(&next))));
    invoke(&mut session, &mut engine, "System.Header.GetTimestamp");
    assert_eq!(
        engine.stack.pop().unwrap().to_bigint().unwrap(),
        num_bigint::BigInt::from(1_015)
    );

    // GetTransactions pushes an array of handles.
    engine
        .stack
        .push(StackValue::InteropHandle(InteropHandle::Block(Arc::clone(&next))));
    invoke(&mut session, &mut engine, "System.Block.GetTransactions");
    let StackValue::Array(handles) = engine.stack.pop().unwrap() else {
        panic!("expected an array of transaction handles");
    };
    assert_eq!(handles.len(), 1);

    // In-range index succeeds, out-of-range faults.
    engine.stack.push(StackValue::from_int(0));
    engine
        .stack
        .push(StackValue::InteropHandle(InteropHandle::Block(Arc::clone(&next))));
    invoke(&mut session, &mut engine, "System.Block.GetTransaction");
    invoke(&mut session, &mut engine, "System.Transaction.GetHash");
    assert_eq!(
        engine.stack.pop().unwrap().to_bytes().unwrap(),
        next.transactions[0].hash().to_vec()
    );

    engine.stack.push(StackValue::from_int(1));
    engine
        .stack
        .push(StackValue::InteropHandle(InteropHandle::Block(next)));
    let err = invoke_err(&mut session, &mut engine, "System.Block.GetTransaction");
    assert!(matches!(err, InteropError::InvalidOperation { .. }));

    // Wrong handle kind faults.
    engine
        .stack
        .push(StackValue::InteropHandle(InteropHandle::Block(genesis)));
    let err = invoke_err(&mut session, &mut engine, "System.Transaction.GetHash");
    assert!(matches!(err, InteropError::InvalidArgument { .. }));
}

#[test]
fn get_time_prefers_the_persisting_block() {
    let store = MemoryStore::shared();
    let (_, next) = chain_with_two_blocks(&store);

    // Inside block persistence: the persisting block's timestamp.
    let snapshot = MemorySnapshot::new(Arc::clone(&store)).with_persisting_block(Arc::clone(&next));
    let mut session = ServiceSession::new(TriggerType::Application, Box::new(snapshot));
    let mut engine = TestEngine::new(script_hash(1));
    invoke(&mut session, &mut engine, "System.Runtime.GetTime");
    assert_eq!(
        engine.stack.pop().unwrap().to_bigint().unwrap(),
        num_bigint::BigInt::from(1_015)
    );

    // Outside: best header timestamp plus the block cadence.
    let mut session = session_over(&store, TriggerType::Application);
    invoke(&mut session, &mut engine, "System.Runtime.GetTime");
    assert_eq!(
        engine.stack.pop().unwrap().to_bigint().unwrap(),
        num_bigint::BigInt::from(1_015 + 15)
    );
}

#[test]
fn contract_destroy_purges_storage() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let doomed = deploy(&mut session, b"doomed", true);
    let survivor = deploy(&mut session, b"survivor", true);

    let mut engine = TestEngine::new(doomed);
    engine.stack.push(StackValue::from_bytes(b"v".to_vec()));
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    invoke(&mut session, &mut engine, "System.Storage.Put");

    let mut engine_s = TestEngine::new(survivor);
    engine_s.stack.push(StackValue::from_bytes(b"sv".to_vec()));
    engine_s.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine_s, "System.Storage.GetContext");
    invoke(&mut session, &mut engine_s, "System.Storage.Put");

    invoke(&mut session, &mut engine, "System.Contract.Destroy");
    session.commit().unwrap();

    let session = session_over(&store, TriggerType::Application);
    assert!(session.snapshot().contract(&doomed).is_none());
    assert!(session
        .snapshot()
        .storage_get(&neo_interop::StorageKey::new(doomed, b"k".to_vec()))
        .is_none());
    assert!(session
        .snapshot()
        .storage_get(&neo_interop::StorageKey::new(survivor, b"k".to_vec()))
        .is_some());
}

#[test]
fn destroy_requires_application_trigger() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Verification);
    let mut engine = TestEngine::new(script_hash(1));
    let err = invoke_err(&mut session, &mut engine, "System.Contract.Destroy");
    assert!(matches!(err, InteropError::TriggerMismatch { .. }));
}

#[test]
fn put_requires_application_trigger() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Verification);
    let contract_hash = deploy(&mut session, b"contract-x", true);
    let mut engine = TestEngine::new(contract_hash);

    engine.stack.push(StackValue::from_bytes(b"v".to_vec()));
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    let err = invoke_err(&mut session, &mut engine, "System.Storage.Put");
    assert!(matches!(err, InteropError::TriggerMismatch { .. }));
}

#[test]
fn put_rejects_storage_less_contracts() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let contract_hash = deploy(&mut session, b"no-storage", false);
    let mut engine = TestEngine::new(contract_hash);

    engine.stack.push(StackValue::from_bytes(b"v".to_vec()));
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    let err = invoke_err(&mut session, &mut engine, "System.Storage.Put");
    assert!(matches!(err, InteropError::StorageViolation { .. }));

    // An undeployed script cannot reach storage at all.
    let mut engine = TestEngine::new(script_hash(0x77));
    engine.stack.push(StackValue::from_bytes(b"v".to_vec()));
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    let err = invoke_err(&mut session, &mut engine, "System.Storage.Put");
    assert!(matches!(err, InteropError::ContractNotFound { .. }));
}

#[test]
fn unknown_method_is_a_non_fatal_false() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(1));
    let mut meter = GasMeter::unlimited();
    let found = session
        .invoke(&mut engine, b"System.No.Such.Method", &mut meter)
        .unwrap();
    assert!(!found);
}

#[test]
fn four_byte_methods_are_taken_as_identifiers() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(1));
    let mut meter = GasMeter::unlimited();

    let id = method_id(b"System.Runtime.Platform").to_le_bytes();
    let found = session.invoke(&mut engine, &id, &mut meter).unwrap();
    assert!(found);
    assert_eq!(
        engine.stack.pop().unwrap().to_bytes().unwrap(),
        b"NEO".to_vec()
    );
}

#[test]
fn gas_is_deducted_before_the_handler_runs() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let tx = single_witness_transaction(b"w");
    let mut engine =
        TestEngine::new(script_hash(1)).with_container(ScriptContainer::Transaction(Arc::new(tx)));

    // CheckWitness costs 200 milli-GAS; a 100 milli-GAS budget refuses
    // and leaves the argument unconsumed.
    let mut meter = GasMeter::new(Fixed8::from_raw(100 * (Fixed8::SCALE / 1000)));
    engine.stack.push(StackValue::from_bytes(vec![0u8; 20]));
    let err = session
        .invoke(&mut engine, b"System.Runtime.CheckWitness", &mut meter)
        .unwrap_err();
    assert!(matches!(err, InteropError::InsufficientGas { .. }));
    assert_eq!(engine.stack.len(), 1);
}

#[test]
fn put_price_scales_with_payload() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let contract_hash = deploy(&mut session, b"contract-x", true);
    let mut engine = TestEngine::new(contract_hash);

    engine.stack.push(StackValue::from_bytes(vec![0u8; 1500]));
    engine.stack.push(StackValue::from_bytes(b"k".to_vec()));
    invoke(&mut session, &mut engine, "System.Storage.GetContext");
    let price = session
        .price_of(&engine, b"System.Storage.Put")
        .unwrap();
    assert_eq!(price, 2000);

    // Fixed prices come straight from the registry.
    assert_eq!(
        session.price_of(&engine, b"System.Storage.Get").unwrap(),
        100
    );
    assert_eq!(
        session.price_of(&engine, b"System.Runtime.CheckWitness").unwrap(),
        200
    );
}

#[test]
fn notifications_accumulate_in_order_and_reach_observers() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(1));

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let subscription = neo_interop::events::subscribe_notify(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    engine.stack.push(StackValue::from_int(1));
    invoke(&mut session, &mut engine, "System.Runtime.Notify");
    engine.stack.push(StackValue::from_int(2));
    invoke(&mut session, &mut engine, "System.Runtime.Notify");

    let notifications = session.notifications();
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].state, StackValue::from_int(1));
    assert_eq!(notifications[1].state, StackValue::from_int(2));
    assert_eq!(notifications[0].script_hash, script_hash(1));
    assert!(seen.load(Ordering::SeqCst) >= 2);

    neo_interop::events::unsubscribe_notify(subscription);
}

#[test]
fn notify_snapshots_the_payload() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(1));

    let list = neo_interop::ValueList::new(vec![StackValue::from_int(1)]);
    engine.stack.push(StackValue::Array(list.clone()));
    invoke(&mut session, &mut engine, "System.Runtime.Notify");

    // Mutating the live value cannot rewrite the recorded one.
    list.push(StackValue::from_int(2));
    let StackValue::Array(recorded) = &session.notifications()[0].state else {
        panic!("expected an array payload");
    };
    assert_eq!(recorded.len(), 1);
}

#[test]
fn log_is_fire_and_forget() {
    use std::sync::Mutex;

    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let mut engine = TestEngine::new(script_hash(1));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = neo_interop::events::subscribe_log(move |args| {
        sink.lock().expect("poisoned").push(args.message.clone());
    });

    engine.stack.push(StackValue::from_bytes(b"hello log".to_vec()));
    invoke(&mut session, &mut engine, "System.Runtime.Log");

    assert!(seen
        .lock()
        .expect("poisoned")
        .contains(&"hello log".to_string()));
    neo_interop::events::unsubscribe_log(subscription);
}

struct ProbeDisposable {
    order: Arc<std::sync::Mutex<Vec<u8>>>,
    tag: u8,
}

impl Disposable for ProbeDisposable {
    fn dispose(&mut self) {
        self.order.lock().expect("poisoned").push(self.tag);
    }
}

#[test]
fn dispose_runs_once_in_registration_order() {
    let store = MemoryStore::shared();
    let mut session = session_over(&store, TriggerType::Application);
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    session.add_disposable(Box::new(ProbeDisposable {
        order: Arc::clone(&order),
        tag: 1,
    }));
    session.add_disposable(Box::new(ProbeDisposable {
        order: Arc::clone(&order),
        tag: 2,
    }));

    session.dispose();
    session.dispose();
    assert_eq!(*order.lock().expect("poisoned"), vec![1, 2]);

    drop(session); // Drop must not re-run disposal.
    assert_eq!(*order.lock().expect("poisoned"), vec![1, 2]);
}
