use crate::models::ProbeTarget;

pub fn expand<'a>(
    fragment: &'a str,
    extensions: &'a [String],
) -> impl Iterator<Item = ProbeTarget> + 'a {
    std::iter::once(ProbeTarget::new(format!("{}/", fragment))).chain(
        extensions
            .iter()
            .map(move |ext| ProbeTarget::new(format!("{}.{}", fragment, ext))),
    )
}
