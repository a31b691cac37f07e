use std::path::PathBuf;

/// Locates a file shipped alongside a package.
///
/// The package directory is taken to be `package_name` relative to the
/// current working directory. `resource_path` uses `/` separators on every
/// platform; empty segments are skipped.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use tiddlyweb_utils::resource_filename;
///
/// let path = resource_filename("tiddlywebwiki", "resources/empty.html");
/// assert_eq!(path, PathBuf::from("tiddlywebwiki").join("resources").join("empty.html"));
/// ```
pub fn resource_filename(package_name: &str, resource_path: &str) -> PathBuf {
    let mut path = PathBuf::from(package_name);
    path.extend(resource_path.split('/').filter(|segment| !segment.is_empty()));
    path
}
