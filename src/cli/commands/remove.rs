use super::super::render;
use super::super::{Ctx, RemoveArgs, load_forest, print_document, print_line, resolve_id, save_forest};
use crate::Result;

pub(crate) fn handle(ctx: &Ctx, args: RemoveArgs) -> Result<()> {
    let mut forest = load_forest(ctx)?;

    // Each id is resolved against the current state, so removing a group
    // and then naming one of its children fails before anything is saved.
    let mut removed = Vec::new();
    for raw in &args.ids {
        let id = resolve_id(&forest, raw)?;
        forest.remove(&id);
        removed.push(id);
    }

    save_forest(ctx, &forest)?;
    if ctx.json {
        return print_document(&forest);
    }
    for id in &removed {
        print_line(&render::render_removed(id))?;
    }
    Ok(())
}
