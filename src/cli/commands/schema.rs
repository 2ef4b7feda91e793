use crate::api::ApiDoc;

pub fn handle() -> anyhow::Result<()> {
    println!("{}", ApiDoc::to_pretty_json()?);
    Ok(())
}
