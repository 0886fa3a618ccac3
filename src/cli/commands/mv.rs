use super::super::render;
use super::super::{
    Ctx, DocumentError, MoveArgs, insert_with, load_forest, print_document, print_line,
    resolve_id, resolve_placement, save_forest,
};
use crate::core::{EntryId, RawEntry};
use crate::Result;

pub(crate) fn handle(ctx: &Ctx, args: MoveArgs) -> Result<()> {
    let mut forest = load_forest(ctx)?;
    let id = resolve_id(&forest, &args.id)?;
    let Some(entry) = forest.entry(&id) else {
        return Err(DocumentError::UnknownId(id).into());
    };

    // The destination must live outside the moved subtree.
    for raw in [&args.parent, &args.before, &args.after]
        .into_iter()
        .flatten()
    {
        let target = EntryId::new(raw.as_str())?;
        if entry.subtree_contains(&target) {
            return Err(DocumentError::MoveIntoSelf(id).into());
        }
    }

    forest.remove(&id);
    let spec = resolve_placement(
        &forest,
        args.parent.as_deref(),
        args.before.as_deref(),
        args.after.as_deref(),
        args.front,
    )?;
    let Some(moved) = insert_with(&mut forest, &spec, RawEntry::from(&entry)) else {
        // The subtree's ids were freed by the removal, so reinsertion
        // cannot conflict.
        return Ok(());
    };

    save_forest(ctx, &forest)?;
    if ctx.json {
        return print_document(&forest);
    }
    print_line(&render::render_moved(&moved))
}
