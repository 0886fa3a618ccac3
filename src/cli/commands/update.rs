use super::super::render;
use super::super::{
    Ctx, DocumentError, UpdateArgs, load_forest, print_document, print_line, resolve_id,
    save_forest,
};
use crate::core::RawEntry;
use crate::Result;

pub(crate) fn handle(ctx: &Ctx, args: UpdateArgs) -> Result<()> {
    let mut forest = load_forest(ctx)?;
    let id = resolve_id(&forest, &args.id)?;

    let mut patch = RawEntry::new();
    if let Some(label) = &args.label {
        patch.payload.set_label(label);
    }
    for (key, value) in &args.fields {
        patch.payload.insert(key, value.clone());
    }
    if args.leaf {
        patch = patch.as_leaf();
    }
    // Promotion only applies to leaves; wiping a populated group takes
    // an explicit --leaf first.
    if args.group
        && let Some(entry) = forest.find(&id)
    {
        if entry.is_group() {
            tracing::warn!(id = %id, "already a group, --group ignored");
        } else {
            patch = patch.with_children(Vec::new());
        }
    }

    if !forest.update(&id, patch) {
        return Err(DocumentError::UnknownId(id).into());
    }

    save_forest(ctx, &forest)?;
    if ctx.json {
        return print_document(&forest);
    }
    print_line(&render::render_updated(&id))
}
