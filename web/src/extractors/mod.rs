pub(crate) mod authenticated_user;
pub(crate) mod compare_api_version;
