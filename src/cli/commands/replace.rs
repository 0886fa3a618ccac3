use super::super::render;
use super::super::{
    Ctx, DocumentError, ReplaceArgs, load_forest, print_document, print_line, resolve_id,
    save_forest,
};
use crate::core::{EntryId, RawEntry};
use crate::Result;

pub(crate) fn handle(ctx: &Ctx, args: ReplaceArgs) -> Result<()> {
    let mut forest = load_forest(ctx)?;
    let old = resolve_id(&forest, &args.id)?;

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
    if let Some(raw) = &args.new_id {
        let id = EntryId::new(raw)?;
        // Reusing the replaced entry's own id is fine.
        if id != old && forest.contains(&id) {
            return Err(DocumentError::DuplicateId(id).into());
        }
        source = source.with_id(id);
    }

    let Some(new) = forest.replace(&old, source) else {
        // Conflicts and the target are checked above.
        return Ok(());
    };

    save_forest(ctx, &forest)?;
    if ctx.json {
        return print_document(&forest);
    }
    print_line(&render::render_replaced(&old, &new))
}
