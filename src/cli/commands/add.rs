use super::super::render;
use super::super::{
    AddArgs, Ctx, DocumentError, insert_with, load_forest, print_document, print_line,
    resolve_placement, save_forest,
};
use crate::core::{EntryId, RawEntry};
use crate::Result;

pub(crate) fn handle(ctx: &Ctx, args: AddArgs) -> Result<()> {
    let mut forest = load_forest(ctx)?;

    let mut source = RawEntry::new();
    if let Some(label) = &args.label {
        source.payload.set_label(label);
    }
    for (key, value) in &args.fields {
        source.payload.insert(key, value.clone());
    }
    if args.group {
        source = source.with_children(Vec::new());
    }
    if let Some(raw) = &args.id {
        let id = EntryId::new(raw)?;
        if forest.contains(&id) {
            return Err(DocumentError::DuplicateId(id).into());
        }
        source = source.with_id(id);
    }

    let spec = resolve_placement(
        &forest,
        args.parent.as_deref(),
        args.before.as_deref(),
        args.after.as_deref(),
        args.front,
    )?;
    let Some(id) = insert_with(&mut forest, &spec, source) else {
        // Duplicate ids are rejected above and targets are resolved, so
        // nothing else can refuse the insert.
        return Ok(());
    };

    save_forest(ctx, &forest)?;
    if ctx.json {
        return print_document(&forest);
    }
    print_line(&render::render_added(&id))
}
