//! Benchmark utilities.

use revtree_codec::Value;
use revtree_core::{
    Address, AtomicCommand, Command, Config, Id, Intent, MemoryModel, Repository, SyncLog,
    Transaction,
};

/// Parses a generated id.
pub fn id(raw: &str) -> Id {
    Id::new(raw).expect("generated ids are valid")
}

/// Address of the benchmark model.
pub fn model_address() -> Address {
    Address::model(id("bench"), id("m"))
}

/// A model at revision 0 with `objects` objects of `fields` valued fields each.
pub fn wide_model(objects: usize, fields: usize) -> MemoryModel {
    let mut model = MemoryModel::new(model_address(), 0).expect("model address");
    for o in 0..objects {
        let object = model
            .create_object(id(&format!("o{o}")), 0)
            .expect("new object");
        for f in 0..fields {
            object
                .create_field(id(&format!("f{f}")), 0)
                .expect("new field")
                .set_value(Some(Value::Integer(f as i64)));
        }
    }
    model
}

/// A transaction changing field `f0` of the first `count` objects.
pub fn change_values(count: usize) -> Command {
    let commands = (0..count)
        .map(|o| {
            let field = Address::field(id("bench"), id("m"), id(&format!("o{o}")), id("f0"));
            AtomicCommand::change_value(&field, Value::Integer(-1), Intent::SafeStateBound)
                .expect("value command")
        })
        .collect();
    Transaction::new(model_address(), commands)
        .expect("transaction")
        .into()
}

/// A sync log of `entries` single-object commits.
pub fn long_log(entries: usize) -> SyncLog {
    let repo = Repository::new(Config::new().repository_id("bench").log_rejections(false))
        .expect("valid config");
    repo.insert_model(MemoryModel::new(model_address(), 0).expect("model address"))
        .expect("model fits repository");
    for o in 0..entries {
        let command =
            AtomicCommand::add_object(&model_address(), id(&format!("o{o}")), Intent::Forced)
                .expect("object command");
        repo.execute(&command.into()).expect("well-formed command");
    }
    repo.sync_log(&id("m")).expect("model has a log")
}
