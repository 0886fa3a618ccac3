use super::super::render;
use super::super::{
    Ctx, DocumentError, ShowArgs, load_forest, print_document, print_line, resolve_id,
};
use crate::Result;

pub(crate) fn handle(ctx: &Ctx, args: ShowArgs) -> Result<()> {
    let forest = load_forest(ctx)?;

    let Some(raw) = args.id.as_deref() else {
        if ctx.json {
            return print_document(&forest);
        }
        return print_line(&render::render_forest(forest.roots(), &ctx.config.render));
    };

    let id = resolve_id(&forest, raw)?;
    let Some(entry) = forest.entry(&id) else {
        return Err(DocumentError::UnknownId(id).into());
    };
    if ctx.json {
        let s = serde_json::to_string_pretty(&entry).map_err(DocumentError::Render)?;
        return print_line(&s);
    }
    print_line(&render::render_entry(&entry, &ctx.config.render))
}
